//! Domain layer for esnotes: notes, sessions, the session store interface and
//! identifier allocation.

pub mod config;
pub mod error;
pub mod id;
pub mod note;
pub mod session;
pub mod timestamp;

// Re-export common error type
pub use error::{EsnotesError, ImportFailure, Result};
