//! Persisted client settings
//!
//! Process-wide key/value state for the operator's preferences: tick
//! speed, manual-override mode, the manual policy action, and the selected
//! agent model. Loaded once at startup, written synchronously on every
//! change, survives restarts.
//!
//! Values are stored string-encoded in a single JSON file (the durable
//! stand-in for browser-local storage): `speed` as a float string,
//! `manual_mode` as `"true"`/`"false"`, `manual_action` as a JSON-encoded
//! policy action, `selected_model` as a plain string.
//!
//! A missing file means first run (all defaults). A corrupt individual
//! value degrades to that key's default; an unparsable file is surfaced as
//! an error rather than silently destroyed.

use crate::models::snapshot::PolicyAction;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

const KEY_SPEED: &str = "speed";
const KEY_MANUAL_MODE: &str = "manual_mode";
const KEY_MANUAL_ACTION: &str = "manual_action";
const KEY_SELECTED_MODEL: &str = "selected_model";

const DEFAULT_SPEED: f64 = 1.0;

/// Manual action applied before the operator has edited any slider.
pub fn default_manual_action() -> PolicyAction {
    PolicyAction {
        income_tax: 0.2,
        corp_tax: 0.2,
        ubi: 0.0,
    }
}

/// Errors that can occur while loading or persisting settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {} is not valid JSON", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode settings value")]
    Encode(#[from] serde_json::Error),
}

/// File-backed key/value settings store.
///
/// # Example
///
/// ```rust,no_run
/// use ecosim_monitor_core::SettingsStore;
///
/// let mut settings = SettingsStore::open("console-settings.json").unwrap();
/// assert_eq!(settings.speed(), 1.0);
/// settings.set_speed(4.0).unwrap();
/// ```
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl SettingsStore {
    /// Load settings from `path`, or start empty if the file does not
    /// exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| SettingsError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tick speed in steps per second. Defaults to 1.0; non-positive or
    /// unparsable stored values also fall back to the default.
    pub fn speed(&self) -> f64 {
        self.values
            .get(KEY_SPEED)
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value > 0.0)
            .unwrap_or(DEFAULT_SPEED)
    }

    pub fn set_speed(&mut self, value: f64) -> Result<(), SettingsError> {
        self.values.insert(KEY_SPEED.to_string(), value.to_string());
        self.persist()
    }

    /// Whether the operator's manual policy override is active.
    pub fn manual_mode(&self) -> bool {
        self.values
            .get(KEY_MANUAL_MODE)
            .map(|raw| raw == "true")
            .unwrap_or(false)
    }

    pub fn set_manual_mode(&mut self, enabled: bool) -> Result<(), SettingsError> {
        self.values
            .insert(KEY_MANUAL_MODE.to_string(), enabled.to_string());
        self.persist()
    }

    /// The operator's manual policy action; authoritative only while
    /// manual mode is active.
    pub fn manual_action(&self) -> PolicyAction {
        self.values
            .get(KEY_MANUAL_ACTION)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_else(default_manual_action)
    }

    pub fn set_manual_action(&mut self, action: &PolicyAction) -> Result<(), SettingsError> {
        let raw = serde_json::to_string(action)?;
        self.values.insert(KEY_MANUAL_ACTION.to_string(), raw);
        self.persist()
    }

    /// Name of the agent model the operator selected, if any.
    pub fn selected_model(&self) -> Option<&str> {
        self.values.get(KEY_SELECTED_MODEL).map(String::as_str)
    }

    pub fn set_selected_model(&mut self, name: &str) -> Result<(), SettingsError> {
        self.values
            .insert(KEY_SELECTED_MODEL.to_string(), name.to_string());
        self.persist()
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
