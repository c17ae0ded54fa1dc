//! File-backed implementations of the Convoy storage traits.

pub mod config_service;
pub mod file_state_store;
pub mod jsonl_debug_log;
pub mod jsonl_event_log;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_state_store::FileStateStore;
pub use crate::jsonl_debug_log::JsonlDebugLog;
pub use crate::jsonl_event_log::JsonlEventLog;
pub use crate::paths::ConvoyPaths;
