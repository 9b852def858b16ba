//! Session domain module.
//!
//! This module contains the session model and the store interface that hides
//! how sessions are persisted.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`)
//! - `store`: Store trait for session persistence (`SessionStore`)
//!
//! # Usage
//!
//! ```ignore
//! use esnotes_core::session::{Session, SessionStore};
//! ```

mod model;
mod store;

// Re-export public API
pub use model::Session;
pub use store::{SessionStore, validate_collection};
