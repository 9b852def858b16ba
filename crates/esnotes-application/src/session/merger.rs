//! Session import/export.
//!
//! `SessionMerger` validates an externally supplied JSON collection of sessions,
//! gives every imported session and note a fresh identifier, and appends the
//! result to the store. Export writes the store collection out verbatim.

use esnotes_core::id::IdAllocator;
use esnotes_core::note::{Note, NoteType, tag_or_none};
use esnotes_core::session::{Session, SessionStore};
use esnotes_core::{EsnotesError, ImportFailure, Result, timestamp};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A session as it appears in an import file.
///
/// `id` is captured only so that it is dropped rather than carried in `extra`.
#[derive(Debug, Deserialize)]
struct ImportedSession {
    #[serde(default, rename = "id")]
    _previous_id: Option<Value>,
    name: String,
    notes: Vec<ImportedNote>,
    date: Value,
    #[serde(default)]
    duration: u64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A note as it appears in an import file.
///
/// Classification fields are optional and may be `null`; they are normalized the
/// same way as notes logged interactively.
#[derive(Debug, Deserialize)]
struct ImportedNote {
    #[serde(default, rename = "id")]
    _previous_id: Option<Value>,
    #[serde(rename = "type", default)]
    note_type: Option<NoteType>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    app: Option<String>,
    #[serde(default)]
    os: Option<String>,
    #[serde(default)]
    env: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ImportedNote {
    /// Builds a note with an empty id; the id is assigned when the import is applied.
    fn into_note(self) -> Note {
        Note {
            id: String::new(),
            note_type: self.note_type.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            app: tag_or_none(self.app),
            os: tag_or_none(self.os),
            env: tag_or_none(self.env),
            extra: self.extra,
        }
    }
}

impl ImportedSession {
    /// Converts to a domain session with a canonical date and empty identifiers.
    fn into_session(self, index: usize) -> Result<Session> {
        let date = timestamp::parse_date_value(&self.date).ok_or_else(|| {
            EsnotesError::import(
                ImportFailure::InvalidDate,
                format!("session at index {} has unparsable date {}", index, self.date),
            )
        })?;

        Ok(Session {
            id: String::new(),
            name: self.name,
            notes: self.notes.into_iter().map(ImportedNote::into_note).collect(),
            date,
            duration: self.duration,
            extra: self.extra,
        })
    }
}

/// Copies `pending` into `sessions`, giving every session and note an id unique
/// against the collection it joins.
fn append_with_fresh_ids(sessions: &mut Vec<Session>, pending: &[Session]) {
    let mut ids = IdAllocator::for_sessions(sessions.iter());
    for session in pending {
        let mut session = session.clone();
        session.id = ids.allocate();
        for note in &mut session.notes {
            note.id = ids.allocate();
        }
        sessions.push(session);
    }
}

/// Parses and shape-checks import text without touching any store.
fn parse_import(content: &str) -> Result<Vec<ImportedSession>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| EsnotesError::import(ImportFailure::MalformedJson, e.to_string()))?;

    let Value::Array(elements) = value else {
        return Err(EsnotesError::import(
            ImportFailure::InvalidFormat,
            "expected a JSON array of sessions",
        ));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            let session: ImportedSession = serde_json::from_value(element).map_err(|e| {
                EsnotesError::import(
                    ImportFailure::InvalidFormat,
                    format!("session at index {}: {}", index, e),
                )
            })?;
            if session.name.trim().is_empty() {
                return Err(EsnotesError::import(
                    ImportFailure::InvalidFormat,
                    format!("session at index {} has an empty name", index),
                ));
            }
            Ok(session)
        })
        .collect()
}

/// Imports sessions into, and exports sessions from, a `SessionStore`.
///
/// Imports are all-or-nothing: every validation step runs before the store is
/// touched, and identifiers are assigned inside a single `SessionStore::update`.
pub struct SessionMerger {
    store: Arc<dyn SessionStore>,
}

impl SessionMerger {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Merges the sessions in `content` into the store.
    ///
    /// # Returns
    ///
    /// The number of sessions imported.
    ///
    /// # Errors
    ///
    /// - `Import { MalformedJson }`: `content` is not JSON
    /// - `Import { InvalidFormat }`: not an array, or an element lacks `name`/`notes`/`date`
    /// - `Import { InvalidDate }`: a `date` cannot be parsed
    /// - storage errors from `SessionStore::update`
    ///
    /// The store is unchanged on any error.
    pub fn import_str(&self, content: &str) -> Result<usize> {
        let imported = parse_import(content)?;
        if imported.is_empty() {
            tracing::info!("[SessionMerger] Import contained no sessions");
            return Ok(0);
        }

        let pending = imported
            .into_iter()
            .enumerate()
            .map(|(index, session)| session.into_session(index))
            .collect::<Result<Vec<_>>>()?;

        let count = pending.len();
        self.store.update(&mut |sessions| {
            append_with_fresh_ids(sessions, &pending);
            Ok(())
        })?;

        tracing::info!("[SessionMerger] Imported {} sessions", count);
        Ok(count)
    }

    /// Reads `path` and merges its sessions into the store.
    ///
    /// See [`SessionMerger::import_str`]. A file that is not UTF-8 text is reported
    /// as malformed JSON.
    pub async fn import_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        tracing::debug!("[SessionMerger] Reading import file {:?}", path);

        let bytes = tokio::fs::read(path).await?;
        let content = String::from_utf8(bytes).map_err(|e| {
            EsnotesError::import(
                ImportFailure::MalformedJson,
                format!("file is not valid UTF-8: {}", e),
            )
        })?;

        self.import_str(&content)
    }

    /// Serializes the whole store collection as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String> {
        let sessions = self.store.list();
        Ok(serde_json::to_string_pretty(&sessions)?)
    }

    /// Writes the export to `dir/file_name` and returns the written path.
    pub async fn export_to_dir(&self, dir: impl AsRef<Path>, file_name: &str) -> Result<PathBuf> {
        let dir = dir.as_ref();
        let path = dir.join(file_name);
        let json = self.export_json()?;

        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, json).await?;

        tracing::info!("[SessionMerger] Exported sessions to {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esnotes_core::note::{NONE_TAG, NoteDraft};
    use esnotes_infrastructure::{InMemorySessionStore, JsonSessionStore};
    use serde_json::json;
    use std::collections::HashSet;

    fn merger_with(sessions: Vec<Session>) -> (Arc<InMemorySessionStore>, SessionMerger) {
        let store = Arc::new(InMemorySessionStore::with_sessions(sessions).unwrap());
        let merger = SessionMerger::new(store.clone());
        (store, merger)
    }

    fn existing_session() -> Session {
        let mut session = Session::new("existing", "Existing");
        session.date = timestamp::parse_date_str("2024-05-01T12:00:00Z").unwrap();
        session.notes.push(
            Note::from_draft("existing-note", NoteDraft::new(NoteType::Bug, "crash")).unwrap(),
        );
        session
    }

    #[test]
    fn test_import_scenario() {
        let (store, merger) = merger_with(vec![]);
        let input = json!([
            {"name": "S1", "notes": [], "date": "2024-01-01T00:00:00.000Z"},
            {"name": "S2", "notes": [{"type": "Note", "content": "hi"}], "date": "2024-01-02T00:00:00.000Z"}
        ]);

        let count = merger.import_str(&input.to_string()).unwrap();

        assert_eq!(count, 2);
        let sessions = store.list();
        let names: Vec<&str> = sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["S1", "S2"]);
        assert_eq!(sessions[1].notes.len(), 1);
        assert_eq!(sessions[1].notes[0].content, "hi");
        assert_eq!(sessions[1].notes[0].app, NONE_TAG);
    }

    #[test]
    fn test_import_malformed_json() {
        let (store, merger) = merger_with(vec![existing_session()]);

        let err = merger.import_str("invalid json data").unwrap_err();

        assert_eq!(err.import_failure(), Some(ImportFailure::MalformedJson));
        assert_eq!(store.list(), vec![existing_session()]);
    }

    #[test]
    fn test_import_non_array() {
        let (store, merger) = merger_with(vec![existing_session()]);

        let err = merger.import_str(r#"{"notAnArray": true}"#).unwrap_err();

        assert_eq!(err.import_failure(), Some(ImportFailure::InvalidFormat));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_import_missing_required_fields() {
        let (store, merger) = merger_with(vec![]);

        for element in [
            json!({"notes": [], "date": "2024-01-01"}),
            json!({"name": "x", "date": "2024-01-01"}),
            json!({"name": "x", "notes": []}),
            json!({"name": "x", "notes": "not a list", "date": "2024-01-01"}),
            json!({"name": "  ", "notes": [], "date": "2024-01-01"}),
            json!("just a string"),
        ] {
            let input = json!([{"name": "ok", "notes": [], "date": "2024-01-01"}, element]);
            let err = merger.import_str(&input.to_string()).unwrap_err();
            assert_eq!(
                err.import_failure(),
                Some(ImportFailure::InvalidFormat),
                "element {:?}",
                input[1]
            );
            assert!(err.to_string().contains("index 1"));
        }
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_import_invalid_date_aborts_everything() {
        let (store, merger) = merger_with(vec![existing_session()]);
        let input = json!([
            {"name": "good", "notes": [], "date": "2024-01-01T00:00:00.000Z"},
            {"name": "bad", "notes": [], "date": "not a date"}
        ]);

        let err = merger.import_str(&input.to_string()).unwrap_err();

        assert_eq!(err.import_failure(), Some(ImportFailure::InvalidDate));
        assert_eq!(store.list(), vec![existing_session()]);
    }

    #[test]
    fn test_import_regenerates_all_identifiers() {
        let (store, merger) = merger_with(vec![existing_session()]);
        let input = json!([
            {"id": "existing", "name": "A", "notes": [{"id": "existing-note", "content": "a"}], "date": "2024-01-01"},
            {"id": "existing", "name": "B", "notes": [{"id": 1000, "content": "b"}], "date": 1725060219774_i64}
        ]);

        assert_eq!(merger.import_str(&input.to_string()).unwrap(), 2);

        let sessions = store.list();
        assert_eq!(sessions.len(), 3);
        let ids: Vec<&str> = sessions.iter().flat_map(|s| s.ids()).collect();
        assert_eq!(ids.len(), 5);
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());

        // Previous ids are dropped, not carried in the extra fields
        assert!(sessions[1].extra.is_empty());
        assert!(sessions[1].notes[0].extra.is_empty());
    }

    #[test]
    fn test_import_normalizes_dates_and_carries_extra_fields() {
        let (store, merger) = merger_with(vec![]);
        let input = json!([{
            "name": "Offset",
            "notes": [{"type": "Blocked", "content": "x", "severity": "high"}],
            "date": "2024-01-01T09:00:00+09:00",
            "duration": 600,
            "noteCount": 1
        }]);

        merger.import_str(&input.to_string()).unwrap();

        let session = &store.list()[0];
        assert_eq!(
            timestamp::to_canonical(&session.date),
            "2024-01-01T00:00:00.000Z"
        );
        assert_eq!(session.duration, 600);
        assert_eq!(session.extra.get("noteCount"), Some(&json!(1)));
        assert_eq!(
            session.notes[0].note_type,
            NoteType::Custom("Blocked".to_string())
        );
        assert_eq!(session.notes[0].extra.get("severity"), Some(&json!("high")));
    }

    #[test]
    fn test_import_defaults_null_and_blank_note_fields() {
        let (store, merger) = merger_with(vec![]);
        let input = json!([{
            "name": "S",
            "notes": [
                {"type": null, "content": "x", "app": null, "os": "  ", "env": "INT"},
                {"type": "", "content": null}
            ],
            "date": "2024-01-01T00:00:00.000Z"
        }]);

        assert_eq!(merger.import_str(&input.to_string()).unwrap(), 1);

        let notes = &store.list()[0].notes;
        assert_eq!(notes[0].note_type, NoteType::Note);
        assert_eq!(notes[0].app, NONE_TAG);
        assert_eq!(notes[0].os, NONE_TAG);
        assert_eq!(notes[0].env, "INT");
        assert_eq!(notes[1].note_type, NoteType::Note);
        assert_eq!(notes[1].content, "");
        assert_eq!(
            (&notes[1].app, &notes[1].os, &notes[1].env),
            (&NONE_TAG.to_string(), &NONE_TAG.to_string(), &NONE_TAG.to_string())
        );
    }

    #[test]
    fn test_imported_dates_match_across_stores() {
        let input = json!([{"name": "S", "notes": [], "date": "2024-01-01T00:00:00.123456Z"}])
            .to_string();

        let (memory, memory_merger) = merger_with(vec![]);
        memory_merger.import_str(&input).unwrap();

        let temp_dir = tempfile::TempDir::new().unwrap();
        let file_store = Arc::new(JsonSessionStore::new(temp_dir.path()));
        SessionMerger::new(file_store.clone())
            .import_str(&input)
            .unwrap();
        let reloaded = JsonSessionStore::new(temp_dir.path()).list();

        assert_eq!(memory.list()[0].date, reloaded[0].date);
        assert_eq!(
            timestamp::to_canonical(&reloaded[0].date),
            "2024-01-01T00:00:00.123Z"
        );
    }

    #[test]
    fn test_import_empty_array() {
        let (store, merger) = merger_with(vec![existing_session()]);
        assert_eq!(merger.import_str("[]").unwrap(), 0);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_export_is_verbatim() {
        let (_store, merger) = merger_with(vec![existing_session()]);

        let exported: Value = serde_json::from_str(&merger.export_json().unwrap()).unwrap();

        assert_eq!(exported, serde_json::to_value(vec![existing_session()]).unwrap());
        assert_eq!(exported[0]["id"], "existing");
    }

    #[tokio::test]
    async fn test_import_file_rejects_non_utf8() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("binary.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let (_store, merger) = merger_with(vec![]);

        let err = merger.import_file(&path).await.unwrap_err();
        assert_eq!(err.import_failure(), Some(ImportFailure::MalformedJson));
    }

    #[tokio::test]
    async fn test_import_file_missing_is_io_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let (_store, merger) = merger_with(vec![]);

        let err = merger
            .import_file(temp_dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(err.is_io());
    }
}
