//! Dashboard state
//!
//! The reconciliation point: the only component that couples "what the
//! user asked for" with "what the server last reported". Owns the current
//! snapshot, the rolling history, the last-observed connection status and
//! running flag, and composes the settings store with the outbound
//! command channel.
//!
//! # Critical Invariants
//!
//! 1. Single writer: history and the current snapshot are mutated only by
//!    these event handlers; presentation reads, never mutates
//! 2. RESET's local effects (clearing history, stopping) apply
//!    synchronously and unconditionally, before any later frame
//! 3. The manual action is merged field-by-field and always sent complete;
//!    the peer never receives a partial policy

use crate::history::HistoryBuffer;
use crate::link::{channel::CommandChannel, ConnectionStatus, LinkEvent};
use crate::models::command::Command;
use crate::models::snapshot::{ActionField, PolicyAction, Snapshot};
use crate::settings::{SettingsError, SettingsStore};
use tracing::{debug, warn};

/// Live console state, advanced by link events and operator intents.
#[derive(Debug)]
pub struct DashboardState {
    settings: SettingsStore,
    commands: CommandChannel,
    history: HistoryBuffer,
    current: Option<Snapshot>,
    connection_status: ConnectionStatus,
    running: bool,
    dropped_frames: u64,
}

impl DashboardState {
    pub fn new(settings: SettingsStore, commands: CommandChannel) -> Self {
        Self {
            settings,
            commands,
            history: HistoryBuffer::new(),
            current: None,
            connection_status: ConnectionStatus::Connecting,
            running: false,
            dropped_frames: 0,
        }
    }

    /// Apply one link event. Runs to completion before the next event is
    /// dispatched; there is no partial application.
    pub fn handle_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Status(status) => {
                debug!(%status, "connection status changed");
                self.connection_status = status;
            }
            LinkEvent::Frame(snapshot) => {
                self.history.append((*snapshot).clone());
                self.current = Some(*snapshot);
            }
            LinkEvent::DecodeError(reason) => {
                self.dropped_frames += 1;
                warn!(%reason, dropped = self.dropped_frames, "dropped malformed frame");
            }
        }
    }

    /// Ask the simulation to resume. The running flag flips optimistically
    /// once the command is actually forwarded; the UI does not wait for a
    /// server acknowledgment.
    pub fn start(&mut self) -> bool {
        if self.commands.send(Command::Start) {
            self.running = true;
            return true;
        }
        false
    }

    /// Ask the simulation to pause.
    pub fn stop(&mut self) -> bool {
        if self.commands.send(Command::Stop) {
            self.running = false;
            return true;
        }
        false
    }

    /// Reset the simulation. The remote command is best effort, but the
    /// local effects (clearing history, stopping) always apply, regardless
    /// of connection status. A stale frame arriving afterwards is simply
    /// appended as the new baseline.
    pub fn reset(&mut self) {
        self.commands.send(Command::Reset);
        self.running = false;
        self.history.clear();
    }

    /// Persist a new tick speed and forward it to the peer. Non-positive
    /// or non-finite values are rejected without side effects.
    pub fn set_speed(&mut self, value: f64) -> Result<(), SettingsError> {
        if !value.is_finite() || value <= 0.0 {
            warn!(value, "ignoring invalid speed");
            return Ok(());
        }
        self.settings.set_speed(value)?;
        self.commands.send(Command::SetSpeed { value });
        Ok(())
    }

    /// Toggle the manual policy override.
    ///
    /// When switching into manual mode the complete current manual action
    /// is sent immediately, so the remote agent does not keep acting on a
    /// stale action while the console displays the manual one.
    pub fn set_manual(&mut self, enabled: bool) -> Result<(), SettingsError> {
        self.settings.set_manual_mode(enabled)?;
        self.commands.send(Command::SetManual { value: enabled });
        if enabled {
            let action = self.settings.manual_action();
            self.commands.send(Command::UpdateAction { action });
        }
        Ok(())
    }

    /// Edit a single field of the manual action. The field is merged into
    /// the existing action, persisted, and the complete merged action is
    /// sent; the peer always receives a fully specified policy.
    pub fn set_action_field(
        &mut self,
        field: ActionField,
        value: f64,
    ) -> Result<(), SettingsError> {
        let action = self.settings.manual_action().with_field(field, value);
        self.settings.set_manual_action(&action)?;
        self.commands.send(Command::UpdateAction { action });
        Ok(())
    }

    /// Remember the operator's model choice. Activation is the registry
    /// collaborator's job and is fire-and-forget from this core.
    pub fn select_model(&mut self, name: &str) -> Result<(), SettingsError> {
        self.settings.set_selected_model(name)
    }

    /// The policy currently in effect from the operator's point of view:
    /// the manual action while manual mode is active, otherwise the
    /// agent-reported action from the latest snapshot.
    pub fn active_action(&self) -> PolicyAction {
        if self.settings.manual_mode() {
            self.settings.manual_action()
        } else {
            self.current
                .as_ref()
                .map(|snapshot| snapshot.action)
                .unwrap_or_default()
        }
    }

    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Malformed frames discarded since startup.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }
}
