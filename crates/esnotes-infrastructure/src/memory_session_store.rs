//! In-memory SessionStore implementation.
//!
//! Keeps the collection in a `Mutex<Vec<Session>>`. Nothing survives the
//! process; used for tests and throwaway runs.

use esnotes_core::session::{Session, SessionStore, validate_collection};
use esnotes_core::{EsnotesError, Result};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<Vec<Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `sessions`.
    pub fn with_sessions(sessions: Vec<Session>) -> Result<Self> {
        validate_collection(&sessions)?;
        Ok(Self {
            sessions: Mutex::new(sessions),
        })
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for InMemorySessionStore {
    fn list(&self) -> Vec<Session> {
        self.guard().clone()
    }

    fn get(&self, session_id: &str) -> Option<Session> {
        self.guard().iter().find(|s| s.id == session_id).cloned()
    }

    fn add(&self, session: Session) -> Result<()> {
        session.validate()?;
        let mut sessions = self.guard();
        if sessions.iter().any(|s| s.id == session.id) {
            return Err(EsnotesError::validation(format!(
                "Duplicate session id '{}'",
                session.id
            )));
        }
        sessions.push(session);
        Ok(())
    }

    fn remove(&self, session_id: &str) -> Result<()> {
        self.guard().retain(|s| s.id != session_id);
        Ok(())
    }

    fn replace_all(&self, sessions: Vec<Session>) -> Result<()> {
        validate_collection(&sessions)?;
        *self.guard() = sessions;
        Ok(())
    }

    fn update(&self, f: &mut dyn FnMut(&mut Vec<Session>) -> Result<()>) -> Result<()> {
        let mut guard = self.guard();
        let mut working = guard.clone();
        f(&mut working)?;
        validate_collection(&working)?;
        *guard = working;
        Ok(())
    }
}
