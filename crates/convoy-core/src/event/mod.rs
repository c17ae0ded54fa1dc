//! Event domain module.

mod model;
mod repository;

pub use model::{Event, EventReplay, LifecycleEvent, MAX_DETAILS_CHARS, REQUIRED_WORKER_EVENTS};
pub use repository::EventLog;
