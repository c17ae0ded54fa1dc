//! Domain layer of Convoy: session identity and layout, event and debug
//! records, the state document, and the storage traits the infrastructure
//! layer implements.

pub mod config;
pub mod debug;
pub mod error;
pub mod event;
pub mod session;
pub mod state;
pub mod text;
pub mod timestamp;

// Re-export common error type
pub use error::{ConvoyError, Result};
