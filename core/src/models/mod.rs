//! Domain types (Snapshot, Firm, Household, PolicyAction, Command)

pub mod command;
pub mod snapshot;

pub use command::Command;
pub use snapshot::{ActionField, Firm, Household, PolicyAction, Snapshot};
