//! Telemetry link
//!
//! Owns the streaming connection to the simulation server: connect,
//! receive, detect loss, reconnect after a fixed delay, forever. The rest
//! of the console observes only status transitions and decoded frames,
//! never transport internals.
//!
//! A single worker thread owns the socket for the lifetime of the link;
//! it is the only site that ever dials, so there can be at most one
//! active transport connection and a connect racing an in-flight attempt
//! cannot create a duplicate. Events flow to the consumer over a channel;
//! outbound commands flow back over another, interleaved with reads via a
//! short poll timeout on the underlying stream.
//!
//! # State machine
//!
//! `Connecting → Open` on handshake success, `Open → Closed` on any
//! disconnect or error, `Closed → Connecting` after [`RECONNECT_DELAY`],
//! unconditionally. There is no maximum retry count; this is a long-lived
//! monitoring tool expected to outlive transient network faults.

pub mod channel;
mod worker;

use crate::models::command::Command;
use crate::models::snapshot::Snapshot;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub use channel::CommandChannel;

/// Delay between losing the connection and the single scheduled
/// reconnection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Liveness of the transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionStatus {
    /// A connection attempt is in flight
    Connecting = 0,

    /// The stream is live; frames arrive and commands can be forwarded
    Open = 1,

    /// The stream is down; a reconnection attempt is pending
    Closed = 2,
}

impl ConnectionStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ConnectionStatus::Connecting,
            1 => ConnectionStatus::Open,
            _ => ConnectionStatus::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == ConnectionStatus::Open
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Open => "online",
            ConnectionStatus::Closed => "offline",
        };
        f.write_str(label)
    }
}

/// Shared, last-written connection status.
///
/// The link worker is the only writer in production; everything else
/// (command gating, status display) only reads.
#[derive(Debug, Clone)]
pub struct StatusCell(Arc<AtomicU8>);

impl StatusCell {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(ConnectionStatus::Connecting as u8)))
    }

    pub fn get(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, status: ConnectionStatus) {
        self.0.store(status as u8, Ordering::Release);
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Inbound notifications from the link worker.
#[derive(Debug)]
pub enum LinkEvent {
    /// The connection status changed
    Status(ConnectionStatus),

    /// One decoded snapshot frame
    Frame(Box<Snapshot>),

    /// A frame failed to decode and was dropped; the connection stays up
    DecodeError(String),
}

/// Outbound requests to the link worker.
#[derive(Debug)]
pub enum LinkRequest {
    /// Encode and write a command to the peer
    Send(Command),

    /// Tear the connection down and exit the worker
    Shutdown,
}

/// Errors that can occur when establishing a link
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid endpoint url")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("unsupported endpoint scheme {0:?} (expected ws or wss)")]
    UnsupportedScheme(String),

    #[error("failed to spawn link worker thread")]
    Spawn(#[source] std::io::Error),
}

/// Handle to the streaming connection.
///
/// Dropping the handle (or calling [`TelemetryLink::close`]) tears down
/// the active connection and cancels any pending reconnection, so a
/// reconnect attempt can never outlive the link.
#[derive(Debug)]
pub struct TelemetryLink {
    requests: Sender<LinkRequest>,
    events: Receiver<LinkEvent>,
    status: StatusCell,
    worker: Option<JoinHandle<()>>,
}

impl TelemetryLink {
    /// Open a link to the given `ws://` endpoint and start the worker.
    pub fn connect(endpoint: &str) -> Result<Self, LinkError> {
        let endpoint = Url::parse(endpoint)?;
        match endpoint.scheme() {
            "ws" | "wss" => {}
            other => return Err(LinkError::UnsupportedScheme(other.to_string())),
        }

        let (request_tx, request_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let status = StatusCell::new();

        let worker = worker::LinkWorker::new(endpoint, request_rx, event_tx, status.clone());
        let handle = thread::Builder::new()
            .name("telemetry-link".to_string())
            .spawn(move || worker.run())
            .map_err(LinkError::Spawn)?;

        Ok(Self {
            requests: request_tx,
            events: event_rx,
            status,
            worker: Some(handle),
        })
    }

    /// Last-written connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.status.get()
    }

    /// Create an outbound command handle tied to this link's liveness.
    pub fn command_channel(&self) -> CommandChannel {
        CommandChannel::new(self.requests.clone(), self.status.clone())
    }

    /// Wait up to `timeout` for the next link event.
    pub fn poll_event(&self, timeout: Duration) -> Option<LinkEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    /// Drain one pending link event without blocking.
    pub fn try_event(&self) -> Option<LinkEvent> {
        self.events.try_recv().ok()
    }

    /// Tear down the connection and join the worker.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = self.requests.send(LinkRequest::Shutdown);
            let _ = handle.join();
        }
    }
}

impl Drop for TelemetryLink {
    fn drop(&mut self) {
        self.shutdown();
    }
}
