//! Session creation and per-worker lifecycle reporting.

mod factory;
mod reporter;

pub use factory::SessionFactory;
pub use reporter::WorkerReporter;

/// Agent name used for events and debug entries written by the coordinator.
pub const COORDINATOR_AGENT: &str = "coordinator";
