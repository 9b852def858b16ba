//! Note domain module.
//!
//! A note is a single tagged observation logged during a session.
//!
//! # Module Structure
//!
//! - `model`: The `Note` entity, its `NoteType` tag, and the `NoteDraft` input type

mod model;

// Re-export public API
pub use model::{NONE_TAG, Note, NoteDraft, NoteIndicator, NoteType, tag_or_none};
