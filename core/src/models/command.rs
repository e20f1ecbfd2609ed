//! Command wire protocol
//!
//! Typed intents the operator can issue against the running simulation.
//! On the wire each command is a JSON object tagged with a `type`
//! discriminator; payload fields are merged at the top level, so
//! `UPDATE_ACTION` always carries all three policy fields alongside the tag.
//!
//! Delivery is best effort: commands are only meaningful against a live,
//! consistent remote state, so they are forwarded while the link is open
//! and silently dropped otherwise. There is no queueing and no retry.

use crate::models::snapshot::PolicyAction;
use serde::{Deserialize, Serialize};

/// An outbound control command.
///
/// # Example
///
/// ```rust
/// use ecosim_monitor_core::Command;
///
/// let wire = serde_json::to_string(&Command::SetSpeed { value: 2.5 }).unwrap();
/// assert_eq!(wire, r#"{"type":"SET_SPEED","value":2.5}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Resume the simulation loop
    #[serde(rename = "START")]
    Start,

    /// Pause the simulation loop
    #[serde(rename = "STOP")]
    Stop,

    /// Reset the simulation to its initial state
    #[serde(rename = "RESET")]
    Reset,

    /// Change the tick rate (steps per second, positive)
    #[serde(rename = "SET_SPEED")]
    SetSpeed { value: f64 },

    /// Enable or disable manual policy override
    #[serde(rename = "SET_MANUAL")]
    SetManual { value: bool },

    /// Replace the manual policy action; always fully specified, never a
    /// partial patch
    #[serde(rename = "UPDATE_ACTION")]
    UpdateAction {
        #[serde(flatten)]
        action: PolicyAction,
    },
}
