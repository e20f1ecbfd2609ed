//! Link worker loop
//!
//! Runs on a dedicated thread and owns the socket. Interleaves inbound
//! reads with draining the outbound request channel by keeping a short
//! read timeout on the underlying stream, so a quiet peer never starves
//! command delivery and a shutdown request is honored promptly.

use super::{ConnectionStatus, LinkEvent, LinkRequest, StatusCell, RECONNECT_DELAY};
use crate::models::snapshot::Snapshot;
use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Instant;
use tracing::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{connect, Error as WsError, Message, WebSocket};

/// How long a blocking read may wait before the worker checks the
/// outbound queue again.
const READ_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// Why the serve loop ended.
enum Exit {
    /// The transport dropped; schedule a reconnect
    Disconnected,

    /// Teardown was requested; the worker must stop
    Shutdown,
}

pub(super) struct LinkWorker {
    endpoint: url::Url,
    requests: Receiver<LinkRequest>,
    events: Sender<LinkEvent>,
    status: StatusCell,
}

impl LinkWorker {
    pub(super) fn new(
        endpoint: url::Url,
        requests: Receiver<LinkRequest>,
        events: Sender<LinkEvent>,
        status: StatusCell,
    ) -> Self {
        Self {
            endpoint,
            requests,
            events,
            status,
        }
    }

    pub(super) fn run(self) {
        loop {
            if !self.publish(ConnectionStatus::Connecting) {
                return;
            }

            match connect(self.endpoint.as_str()) {
                Ok((socket, _response)) => {
                    info!(endpoint = %self.endpoint, "telemetry stream connected");
                    if !self.publish(ConnectionStatus::Open) {
                        return;
                    }
                    if let Exit::Shutdown = self.serve(socket) {
                        return;
                    }
                }
                Err(err) => {
                    warn!(endpoint = %self.endpoint, error = %err, "connection attempt failed");
                }
            }

            if !self.publish(ConnectionStatus::Closed) {
                return;
            }
            if self.wait_before_reconnect() {
                return;
            }
        }
    }

    /// Record and announce a status transition. Returns false when the
    /// consumer is gone, which ends the worker.
    fn publish(&self, status: ConnectionStatus) -> bool {
        self.status.set(status);
        self.events.send(LinkEvent::Status(status)).is_ok()
    }

    fn serve(&self, mut socket: Socket) -> Exit {
        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            if let Err(err) = stream.set_read_timeout(Some(READ_POLL_INTERVAL)) {
                warn!(error = %err, "failed to configure stream polling");
                return Exit::Disconnected;
            }
        }

        loop {
            if let Some(exit) = self.forward_requests(&mut socket) {
                return exit;
            }

            match socket.read_message() {
                Ok(Message::Text(payload)) => {
                    let event = match serde_json::from_str::<Snapshot>(&payload) {
                        Ok(snapshot) => LinkEvent::Frame(Box::new(snapshot)),
                        Err(err) => LinkEvent::DecodeError(err.to_string()),
                    };
                    if self.events.send(event).is_err() {
                        return Exit::Shutdown;
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("peer closed the telemetry stream");
                    return Exit::Disconnected;
                }
                // Ping/pong are handled by the protocol layer; binary
                // frames are not part of this protocol
                Ok(_) => {}
                Err(WsError::Io(err))
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(err) => {
                    debug!(error = %err, "telemetry stream lost");
                    return Exit::Disconnected;
                }
            }
        }
    }

    /// Drain pending outbound requests onto the socket.
    fn forward_requests(&self, socket: &mut Socket) -> Option<Exit> {
        loop {
            match self.requests.try_recv() {
                Ok(LinkRequest::Send(command)) => {
                    let payload = match serde_json::to_string(&command) {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!(error = %err, "failed to encode command");
                            continue;
                        }
                    };
                    if let Err(err) = socket.write_message(Message::Text(payload)) {
                        warn!(error = %err, "command write failed");
                        return Some(Exit::Disconnected);
                    }
                }
                Ok(LinkRequest::Shutdown) | Err(TryRecvError::Disconnected) => {
                    let _ = socket.close(None);
                    return Some(Exit::Shutdown);
                }
                Err(TryRecvError::Empty) => return None,
            }
        }
    }

    /// Sit out the fixed reconnect delay. Exactly one reconnection is
    /// pending during this window; commands arriving meanwhile are
    /// discarded. Returns true when teardown was requested.
    fn wait_before_reconnect(&self) -> bool {
        let deadline = Instant::now() + RECONNECT_DELAY;
        loop {
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(remaining) if !remaining.is_zero() => remaining,
                _ => return false,
            };

            match self.requests.recv_timeout(remaining) {
                Ok(LinkRequest::Send(command)) => {
                    debug!(?command, "dropping command while disconnected");
                }
                Ok(LinkRequest::Shutdown) => return true,
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return true,
            }
        }
    }
}
