//! EcoSim Monitor Core - Live Telemetry Synchronization
//!
//! Client-side core for a real-time monitoring console attached to a
//! running economic simulation: it maintains a resilient streaming
//! connection to the simulation server, reconciles inbound snapshots into
//! a bounded rolling history, derives trend and sparkline statistics from
//! that history, and turns operator intent into an outbound command
//! protocol.
//!
//! # Architecture
//!
//! - **models**: Wire/domain types (Snapshot, Firm, Household, Command)
//! - **history**: Bounded rolling snapshot log
//! - **metrics**: Pure trend and sparkline transforms
//! - **settings**: Persisted operator preferences
//! - **link**: Streaming connection lifecycle and the command channel
//! - **dashboard**: The reconciliation point composing all of the above
//! - **registry**: Model registry REST collaborator
//!
//! # Critical Invariants
//!
//! 1. At most one active transport connection; reconnection is transparent
//! 2. History never exceeds its fixed capacity and never reorders
//! 3. Commands are delivered only against a live connection, never queued
//! 4. No transport or decode failure is fatal; the worst observable state
//!    is "offline" with a frozen last-known snapshot

// Module declarations
pub mod dashboard;
pub mod history;
pub mod link;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod settings;

// Re-exports for convenience
pub use dashboard::DashboardState;
pub use history::HistoryBuffer;
pub use link::{
    CommandChannel, ConnectionStatus, LinkError, LinkEvent, LinkRequest, StatusCell,
    TelemetryLink, RECONNECT_DELAY,
};
pub use metrics::{normalize, trend, SparklinePoint, Trend, TrendDirection};
pub use models::{
    command::Command,
    snapshot::{ActionField, Firm, Household, PolicyAction, Snapshot},
};
pub use registry::{RegistryClient, RegistryError};
pub use settings::{SettingsError, SettingsStore};
