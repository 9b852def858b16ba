//! JSON file-based SessionStore implementation.
//!
//! All sessions live in one JSON array under the `sessions` key, i.e. a single
//! `sessions.json` file in the data directory. Every mutation rewrites the whole
//! file through `AtomicFile`.

use crate::paths::EsnotesPaths;
use crate::storage::AtomicFile;
use esnotes_core::session::{Session, SessionStore, validate_collection};
use esnotes_core::{EsnotesError, Result};
use std::path::Path;

/// Logical storage key of the session collection.
pub const SESSIONS_KEY: &str = "sessions";

/// Session store backed by a single JSON file.
///
/// Directory structure:
/// ```text
/// data_dir/
/// └── sessions.json    # [{id, name, notes: [...], date, duration}, ...]
/// ```
pub struct JsonSessionStore {
    file: AtomicFile<Vec<Session>>,
}

impl JsonSessionStore {
    /// Creates a store rooted at `data_dir`.
    ///
    /// Nothing is written until the first mutation.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(format!("{}.json", SESSIONS_KEY));
        Self {
            file: AtomicFile::json(path),
        }
    }

    /// Creates a store at the default data directory.
    ///
    /// # Errors
    ///
    /// Returns `EsnotesError::Config` if the data directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let data_dir = EsnotesPaths::data_dir()
            .map_err(|e| EsnotesError::config(format!("Failed to get data directory: {}", e)))?;
        Ok(Self::new(data_dir))
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Reads the collection, downgrading any read failure to an empty one.
    fn load_lenient(file: &AtomicFile<Vec<Session>>) -> Vec<Session> {
        match file.load() {
            Ok(Some(sessions)) => sessions,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(
                    "Session storage at {:?} is unreadable, treating it as empty: {}",
                    file.path(),
                    e
                );
                Vec::new()
            }
        }
    }
}

impl SessionStore for JsonSessionStore {
    fn list(&self) -> Vec<Session> {
        let sessions = Self::load_lenient(&self.file);
        tracing::debug!("Loaded {} sessions from {:?}", sessions.len(), self.path());
        sessions
    }

    fn add(&self, session: Session) -> Result<()> {
        session.validate()?;

        let session_id = session.id.clone();
        self.file.update_with(
            |file| Ok::<_, EsnotesError>(Self::load_lenient(file)),
            |sessions| {
                if sessions.iter().any(|s| s.id == session.id) {
                    return Err(EsnotesError::validation(format!(
                        "Duplicate session id '{}'",
                        session.id
                    )));
                }
                sessions.push(session);
                Ok(())
            },
        )?;

        tracing::info!("Saved session {}", session_id);
        Ok(())
    }

    fn remove(&self, session_id: &str) -> Result<()> {
        if !self.list().iter().any(|s| s.id == session_id) {
            tracing::debug!("Session {} not stored, nothing to remove", session_id);
            return Ok(());
        }

        self.file.update_with(
            |file| Ok::<_, EsnotesError>(Self::load_lenient(file)),
            |sessions| {
                sessions.retain(|s| s.id != session_id);
                Ok(())
            },
        )?;

        tracing::info!("Removed session {}", session_id);
        Ok(())
    }

    fn replace_all(&self, sessions: Vec<Session>) -> Result<()> {
        validate_collection(&sessions)?;

        let count = sessions.len();
        self.file.update_with(
            |_| Ok::<_, EsnotesError>(Vec::new()),
            move |stored| {
                *stored = sessions;
                Ok(())
            },
        )?;

        tracing::info!("Replaced session collection ({} sessions)", count);
        Ok(())
    }

    fn update(&self, f: &mut dyn FnMut(&mut Vec<Session>) -> Result<()>) -> Result<()> {
        let count = self.file.update_with(
            |file| Ok::<_, EsnotesError>(Self::load_lenient(file)),
            |sessions| {
                f(&mut *sessions)?;
                validate_collection(sessions)?;
                Ok(sessions.len())
            },
        )?;

        tracing::info!("Updated session collection ({} sessions)", count);
        Ok(())
    }
}

impl std::fmt::Debug for JsonSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSessionStore")
            .field("path", &self.path())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esnotes_core::note::{Note, NoteDraft, NoteType};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_session(id: &str) -> Session {
        let mut session = Session::new(id, format!("Test Session {}", id));
        session.notes.push(
            Note::from_draft(
                format!("{}-note", id),
                NoteDraft::new(NoteType::Failed, "checkout returns 500").with_env("PROD"),
            )
            .unwrap(),
        );
        session
    }

    #[test]
    fn test_list_on_fresh_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());

        assert!(store.list().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());

        for id in ["c", "a", "b"] {
            store.add(create_test_session(id)).unwrap();
        }

        let ids: Vec<String> = store.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_add_round_trips_through_disk() {
        let temp_dir = TempDir::new().unwrap();
        let session = create_test_session("s1");
        JsonSessionStore::new(temp_dir.path())
            .add(session.clone())
            .unwrap();

        // Reopen from disk
        let reopened = JsonSessionStore::new(temp_dir.path());
        let loaded = reopened.get("s1").unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.notes[0].env, "PROD");
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());

        let err = store.add(Session::new("s1", "   ")).unwrap_err();
        assert!(err.is_validation());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());

        store.add(create_test_session("s1")).unwrap();
        let err = store.add(create_test_session("s1")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());
        store.add(create_test_session("keep")).unwrap();
        store.add(create_test_session("drop")).unwrap();

        store.remove("drop").unwrap();

        let ids: Vec<String> = store.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["keep"]);
        assert!(store.get("drop").is_none());
    }

    #[test]
    fn test_remove_nonexistent_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());
        store.add(create_test_session("s1")).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        store.remove("missing").unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_corrupt_storage_lists_as_empty_and_can_start_fresh() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());
        fs::write(store.path(), "[{\"id\": 1, oops").unwrap();

        assert!(store.list().is_empty());

        store.add(create_test_session("fresh")).unwrap();
        let ids: Vec<String> = store.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["fresh"]);
    }

    #[test]
    fn test_replace_all() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());
        store.add(create_test_session("old")).unwrap();

        store
            .replace_all(vec![create_test_session("x"), create_test_session("y")])
            .unwrap();

        let ids: Vec<String> = store.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }

    #[test]
    fn test_replace_all_rejects_invalid_collection_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());
        store.add(create_test_session("old")).unwrap();

        let err = store
            .replace_all(vec![create_test_session("x"), create_test_session("x")])
            .unwrap_err();

        assert!(err.is_validation());
        let ids: Vec<String> = store.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["old"]);
    }

    #[test]
    fn test_update_sees_writes_from_other_handles() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());
        let other = JsonSessionStore::new(temp_dir.path());
        other.add(create_test_session("other")).unwrap();

        store
            .update(&mut |sessions| {
                sessions.push(create_test_session("mine"));
                Ok(())
            })
            .unwrap();

        let ids: Vec<String> = other.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["other", "mine"]);
    }

    #[test]
    fn test_update_rejects_invalid_result_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());
        store.add(create_test_session("a")).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store
            .update(&mut |sessions| {
                sessions.push(create_test_session("a"));
                Ok(())
            })
            .unwrap_err();
        assert!(err.is_validation());

        let err = store
            .update(&mut |sessions| {
                sessions.clear();
                Err(EsnotesError::internal("stop"))
            })
            .unwrap_err();
        assert!(!err.is_validation());

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_concurrent_updates_keep_every_session() {
        let temp_dir = TempDir::new().unwrap();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let dir = temp_dir.path().to_path_buf();
                scope.spawn(move || {
                    let store = JsonSessionStore::new(dir);
                    for i in 0..10 {
                        store
                            .update(&mut |sessions| {
                                sessions.push(create_test_session(&format!("w{}-{}", worker, i)));
                                Ok(())
                            })
                            .unwrap();
                    }
                });
            }
        });

        let store = JsonSessionStore::new(temp_dir.path());
        assert_eq!(store.list().len(), 40);
    }

    #[test]
    fn test_persisted_layout_is_a_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(temp_dir.path());
        store.add(create_test_session("s1")).unwrap();

        assert!(store.path().ends_with("sessions.json"));
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        let array = raw.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["name"], "Test Session s1");
        assert_eq!(array[0]["notes"][0]["type"], "Failed");
        assert_eq!(array[0]["duration"], 0);
    }
}
