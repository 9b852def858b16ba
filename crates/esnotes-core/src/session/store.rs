//! Session store trait.
//!
//! Defines the interface for session persistence operations. No caller outside a
//! store implementation touches the underlying storage.

use super::model::Session;
use crate::error::{EsnotesError, Result};
use std::collections::HashSet;

/// The durable collection of sessions, addressable by identifier.
///
/// Every mutating operation rewrites the whole persisted collection, so a
/// successful call leaves storage holding exactly the resulting collection.
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Treating absent or unreadable storage as an empty collection in `list`
/// - Serializing mutations so read-modify-write cycles do not interleave
pub trait SessionStore: Send + Sync {
    /// Lists all persisted sessions in storage order.
    ///
    /// Never fails: absent or corrupt storage yields an empty list.
    fn list(&self) -> Vec<Session>;

    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Some(Session)`: Session found
    /// - `None`: No session with that ID
    fn get(&self, session_id: &str) -> Option<Session> {
        self.list().into_iter().find(|s| s.id == session_id)
    }

    /// Appends one session to the collection.
    ///
    /// # Errors
    ///
    /// - `EsnotesError::Validation` if the name is empty or the ID is already stored
    /// - `EsnotesError::Io` / `Serialization` if writing fails
    fn add(&self, session: Session) -> Result<()>;

    /// Removes the session with the given ID.
    ///
    /// Removing an unknown ID is a no-op, not an error.
    fn remove(&self, session_id: &str) -> Result<()>;

    /// Replaces the whole collection in one write.
    ///
    /// # Errors
    ///
    /// - `EsnotesError::Validation` if any session fails `validate_collection`
    /// - `EsnotesError::Io` / `Serialization` if writing fails
    fn replace_all(&self, sessions: Vec<Session>) -> Result<()>;

    /// Runs a read-modify-write of the whole collection as one serialized step.
    ///
    /// `f` sees the current collection. The result is checked with
    /// `validate_collection` and written only if both succeed; otherwise storage
    /// is left unchanged.
    ///
    /// # Errors
    ///
    /// - Any error returned by `f`
    /// - `EsnotesError::Validation` if the modified collection is invalid
    /// - `EsnotesError::Io` / `Serialization` if writing fails
    fn update(&self, f: &mut dyn FnMut(&mut Vec<Session>) -> Result<()>) -> Result<()>;
}

/// Checks that every session is named and that session IDs are unique.
pub fn validate_collection(sessions: &[Session]) -> Result<()> {
    let mut seen = HashSet::with_capacity(sessions.len());
    for session in sessions {
        session.validate()?;
        if !seen.insert(session.id.as_str()) {
            return Err(EsnotesError::validation(format!(
                "Duplicate session id '{}'",
                session.id
            )));
        }
    }
    Ok(())
}
