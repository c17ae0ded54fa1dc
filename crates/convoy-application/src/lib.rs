//! Application layer for Convoy.
//!
//! This crate provides the coordination use cases (session creation, worker
//! reporting, recovery, compliance and health checks) on top of the domain
//! traits in `convoy-core` and the file-backed stores in
//! `convoy-infrastructure`.

pub mod compliance;
pub mod coordinator;
pub mod health;
pub mod recovery;
pub mod session;

pub use compliance::{ComplianceReport, ComplianceVerifier};
pub use coordinator::SessionCoordinator;
pub use health::{HealthMonitor, StaleWorker};
pub use recovery::StateRecovery;
pub use session::{COORDINATOR_AGENT, SessionFactory, WorkerReporter};
