//! Model registry client
//!
//! Thin REST collaborator for the simulation server's model management
//! endpoints: listing available agent models and activating one by name.
//! Calls are fire-and-forget from the telemetry core's perspective:
//! failures are logged by callers and never retried, and an unreachable
//! registry is never fatal to the console.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur talking to the model registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid registry url")]
    InvalidBase(#[from] url::ParseError),

    #[error("registry request failed")]
    Transport(#[from] reqwest::Error),

    #[error("model activation rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ActivateRequest<'a> {
    model_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ActivateResponse {
    status: String,
    #[serde(default)]
    message: String,
}

/// Blocking client for the registry endpoints.
///
/// `base` should be the server origin, e.g. `http://127.0.0.1:8000`.
#[derive(Debug)]
pub struct RegistryClient {
    base: Url,
    http: reqwest::blocking::Client,
}

impl RegistryClient {
    pub fn new(base: &str) -> Result<Self, RegistryError> {
        let base = Url::parse(base)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { base, http })
    }

    /// Fetch the names of all available models.
    pub fn models(&self) -> Result<Vec<String>, RegistryError> {
        let url = self.base.join("models")?;
        let response: ModelsResponse = self
            .http
            .get(url)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.models)
    }

    /// Activate a model by name. Returns the server's status message, or
    /// [`RegistryError::Rejected`] when the server reports an error
    /// status.
    pub fn activate(&self, name: &str) -> Result<String, RegistryError> {
        let url = self.base.join("load_model")?;
        let response: ActivateResponse = self
            .http
            .post(url)
            .json(&ActivateRequest { model_name: name })
            .send()?
            .error_for_status()?
            .json()?;

        if response.status == "error" {
            return Err(RegistryError::Rejected(response.message));
        }
        Ok(response.message)
    }
}
