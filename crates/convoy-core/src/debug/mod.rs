//! Debug log domain module.

mod model;
mod repository;

pub use model::{DebugEntry, DebugLevel, MAX_MESSAGE_CHARS};
pub use repository::DebugLog;
