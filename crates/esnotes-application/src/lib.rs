//! Application layer for esnotes.
//!
//! This crate provides the use cases that sit between the domain model and a
//! front end: importing and exporting session collections, recording a live
//! session, and rendering a session as a paginated text report.

pub mod report;
pub mod session;

pub use report::render_report;
pub use session::{SessionMerger, SessionRecorder, SessionTimer};
