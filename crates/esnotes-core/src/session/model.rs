//! Session domain model.
//!
//! This module contains the Session entity: one exploratory-testing run and
//! the chronological log of notes taken during it.

use crate::error::{EsnotesError, Result};
use crate::note::Note;
use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Represents one exploratory-testing session.
///
/// A session contains:
/// - A display name, required before the session can be persisted
/// - The notes logged during the session, in insertion order
/// - The timestamp fixed when the session was saved
/// - The elapsed seconds captured from the session timer
///
/// The session exclusively owns its notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Human-readable session name
    pub name: String,
    /// Chronological note log
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Timestamp when the session was saved
    #[serde(with = "timestamp::canonical")]
    pub date: DateTime<Utc>,
    /// Elapsed seconds recorded by the session timer
    #[serde(default)]
    pub duration: u64,
    /// Fields not modelled here, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Creates an empty session dated now.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            notes: Vec::new(),
            date: timestamp::now(),
            duration: 0,
            extra: Map::new(),
        }
    }

    /// Checks the fields required before the session may be persisted.
    ///
    /// # Errors
    ///
    /// Returns `EsnotesError::Validation` if the name is empty or whitespace-only.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EsnotesError::validation("Session name cannot be empty"));
        }
        Ok(())
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Iterates over the session id followed by every note id.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.notes.iter().map(|n| n.id.as_str()))
    }
}
