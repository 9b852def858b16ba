//! Identifier allocation for sessions and notes.
//!
//! An `IdAllocator` hands out identifiers that are unique against a reserved
//! set: everything already in the store plus everything it handed out before.

use crate::session::Session;
use std::collections::HashSet;
use uuid::Uuid;

/// Source of candidate identifiers.
///
/// Candidates need not be unique on their own; the allocator rejects any
/// candidate it has already reserved.
pub trait IdSource: Send {
    fn candidate(&mut self) -> String;
}

/// Random UUID v4 candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn candidate(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Collision-checked identifier allocator.
///
/// # Examples
///
/// ```
/// use esnotes_core::id::IdAllocator;
///
/// let mut ids = IdAllocator::new();
/// ids.reserve("taken");
/// let fresh = ids.allocate();
/// assert_ne!(fresh, "taken");
/// assert!(ids.is_reserved(&fresh));
/// ```
pub struct IdAllocator<S: IdSource = UuidSource> {
    reserved: HashSet<String>,
    source: S,
}

impl IdAllocator<UuidSource> {
    pub fn new() -> Self {
        Self::with_source(UuidSource)
    }

    /// Creates an allocator that avoids every session and note ID in `sessions`.
    pub fn for_sessions<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        let mut allocator = Self::new();
        allocator.reserve_sessions(sessions);
        allocator
    }
}

impl Default for IdAllocator<UuidSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: IdSource> IdAllocator<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            reserved: HashSet::new(),
            source,
        }
    }

    /// Marks an identifier as taken.
    pub fn reserve(&mut self, id: impl Into<String>) {
        self.reserved.insert(id.into());
    }

    /// Marks every session and note ID in `sessions` as taken.
    pub fn reserve_sessions<'a>(&mut self, sessions: impl IntoIterator<Item = &'a Session>) {
        for session in sessions {
            for id in session.ids() {
                self.reserved.insert(id.to_string());
            }
        }
    }

    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved.contains(id)
    }

    /// Returns a fresh identifier and reserves it.
    pub fn allocate(&mut self) -> String {
        loop {
            let candidate = self.source.candidate();
            if candidate.is_empty() {
                continue;
            }
            if self.reserved.insert(candidate.clone()) {
                return candidate;
            }
            tracing::debug!("Identifier collision on '{}', drawing again", candidate);
        }
    }
}
