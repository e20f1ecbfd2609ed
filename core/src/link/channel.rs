//! Outbound command channel
//!
//! The outbound half of the protocol: forwards typed command intents to
//! the link worker for wire encoding, gated by connection liveness.
//!
//! Commands issued while the link is not open are silently dropped: no
//! queueing, no retry. Control commands are only meaningful against a
//! live, consistent remote state; queueing stale commands behind a
//! reconnect could apply outdated policy to a different simulation run.

use super::{LinkRequest, StatusCell};
use crate::models::command::Command;
use std::sync::mpsc::Sender;
use tracing::debug;

/// Liveness-gated sender of control commands.
///
/// Cloneable and independent of the link handle's lifetime; sends after
/// the link is gone are dropped like any other non-open send.
#[derive(Debug, Clone)]
pub struct CommandChannel {
    requests: Sender<LinkRequest>,
    status: StatusCell,
}

impl CommandChannel {
    pub fn new(requests: Sender<LinkRequest>, status: StatusCell) -> Self {
        Self { requests, status }
    }

    /// Forward a command if the link is open.
    ///
    /// Returns true when the command was handed to the link worker, false
    /// when it was dropped. A drop is an expected, benign occurrence, not
    /// an error.
    pub fn send(&self, command: Command) -> bool {
        if !self.status.get().is_open() {
            debug!(?command, "dropping command while link is not open");
            return false;
        }

        match self.requests.send(LinkRequest::Send(command)) {
            Ok(()) => true,
            Err(err) => {
                debug!(command = ?err.0, "link worker gone; command dropped");
                false
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.status.get().is_open()
    }
}
