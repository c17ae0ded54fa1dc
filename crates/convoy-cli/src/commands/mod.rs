//! Subcommand implementations.
//!
//! Each command returns `Ok(false)` when it completed but the checked
//! condition did not hold; `main` turns that into a failing exit code.

pub mod monitor;
pub mod session;
pub mod state;
