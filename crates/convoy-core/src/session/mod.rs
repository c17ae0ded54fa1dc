//! Session domain module.
//!
//! # Module Structure
//!
//! - `id`: validated session identifier (`SessionId`)
//! - `layout`: paths inside a session directory (`SessionLayout`)

mod id;
mod layout;

pub use id::{SessionId, slugify};
pub use layout::{
    DEBUG_FILE, EVENTS_FILE, STATE_FILE, STATE_LOCK_FILE, SessionLayout, WORKERS_DIR,
    worker_prefix,
};
