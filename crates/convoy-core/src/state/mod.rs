//! State document domain module.
//!
//! # Module Structure
//!
//! - `model`: `StateDocument`, `WorkerState` and friends
//! - `merge`: deep/shallow patch application
//! - `validation`: worker schema checks
//! - `recovery`: rebuilding a document from the event log
//! - `repository`: the `StateStore` trait

mod merge;
mod model;
mod recovery;
mod repository;
mod validation;

pub use merge::{MergeStrategy, apply_patch, deep_merge, touch_timestamps};
pub use model::{
    CoordinationStatus, RecoveryInfo, STATE_VERSION, StateDocument, StateTimestamps,
    WorkerMetrics, WorkerState, WorkerStatus,
};
pub use recovery::fold_events;
pub use repository::{StateMutation, StateStore};
pub use validation::{
    REQUIRED_WORKER_FIELDS, StateValidation, WorkerValidation, validate_state,
    validate_worker_state,
};
