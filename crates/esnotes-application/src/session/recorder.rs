//! The session currently being recorded.
//!
//! A `SessionRecorder` owns an unsaved draft, a running `SessionTimer`, and the
//! identifier allocator used for the notes logged into it. Nothing reaches the
//! store until `save` succeeds.

use super::timer::SessionTimer;
use esnotes_core::id::IdAllocator;
use esnotes_core::note::{Note, NoteDraft};
use esnotes_core::session::{Session, SessionStore};
use esnotes_core::{EsnotesError, Result, timestamp};
use std::sync::Arc;

pub struct SessionRecorder {
    store: Arc<dyn SessionStore>,
    draft: Session,
    ids: IdAllocator,
    timer: SessionTimer,
    /// True once the draft exists in the store; later saves replace it in place.
    persisted: bool,
}

impl SessionRecorder {
    /// Begins a new, unnamed session and starts its timer.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(store: Arc<dyn SessionStore>) -> Result<Self> {
        let mut ids = IdAllocator::for_sessions(&store.list());
        let draft = Session::new(ids.allocate(), "");
        let timer = SessionTimer::start()?;

        tracing::debug!("[SessionRecorder] Started session {}", draft.id);
        Ok(Self {
            store,
            draft,
            ids,
            timer,
            persisted: false,
        })
    }

    /// Resumes a stored session. The timer continues from its saved duration.
    ///
    /// # Errors
    ///
    /// Returns `EsnotesError::NotFound` if no session has `session_id`.
    pub fn open(store: Arc<dyn SessionStore>, session_id: &str) -> Result<Self> {
        let sessions = store.list();
        let draft = sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
            .ok_or_else(|| EsnotesError::not_found("Session", session_id))?;
        let ids = IdAllocator::for_sessions(&sessions);
        let timer = SessionTimer::start_from(draft.duration)?;

        tracing::debug!("[SessionRecorder] Reopened session {}", draft.id);
        Ok(Self {
            store,
            draft,
            ids,
            timer,
            persisted: true,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.draft.id
    }

    pub fn name(&self) -> &str {
        &self.draft.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    /// Appends a note to the draft.
    ///
    /// # Errors
    ///
    /// Returns `EsnotesError::Validation` for blank content; the draft is unchanged.
    pub fn add_note(&mut self, draft: NoteDraft) -> Result<&Note> {
        let note = Note::from_draft(self.ids.allocate(), draft)?;
        self.draft.notes.push(note);
        Ok(&self.draft.notes[self.draft.notes.len() - 1])
    }

    pub fn notes(&self) -> &[Note] {
        &self.draft.notes
    }

    pub fn clear_notes(&mut self) {
        self.draft.notes.clear();
    }

    pub fn elapsed(&self) -> u64 {
        self.timer.elapsed()
    }

    pub fn is_saved(&self) -> bool {
        self.persisted
    }

    /// Persists the draft and stops the timer.
    ///
    /// The first save of a new session fixes its date and adds it to the store.
    /// Saving a reopened (or already saved) session replaces the stored copy and
    /// keeps its original date.
    ///
    /// # Errors
    ///
    /// Returns `EsnotesError::Validation` if the name is blank; nothing is written.
    pub fn save(&mut self) -> Result<Session> {
        self.draft.validate()?;

        let mut session = self.draft.clone();
        session.duration = self.timer.elapsed();

        if self.persisted {
            self.store.update(&mut |sessions| {
                match sessions.iter_mut().find(|s| s.id == session.id) {
                    Some(stored) => *stored = session.clone(),
                    None => sessions.push(session.clone()),
                }
                Ok(())
            })?;
        } else {
            session.date = timestamp::now();
            self.store.add(session.clone())?;
        }

        self.timer.stop();
        self.draft = session.clone();
        self.persisted = true;

        tracing::info!(
            "[SessionRecorder] Saved session '{}' ({} notes, {}s)",
            session.name,
            session.note_count(),
            session.duration
        );
        Ok(session)
    }

    /// Discards the draft and stops the timer.
    pub fn close(mut self) {
        let elapsed = self.timer.stop();
        tracing::debug!(
            "[SessionRecorder] Closed session {} after {}s",
            self.draft.id,
            elapsed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esnotes_core::note::{NONE_TAG, NoteType};
    use esnotes_infrastructure::{InMemorySessionStore, JsonSessionStore};

    fn store() -> Arc<InMemorySessionStore> {
        Arc::new(InMemorySessionStore::new())
    }

    #[tokio::test]
    async fn test_add_note_assigns_ids_and_defaults() {
        let mut recorder = SessionRecorder::start(store()).unwrap();

        let first = recorder
            .add_note(NoteDraft::new(NoteType::Bug, "crash on login").with_app("UCL"))
            .unwrap()
            .clone();
        recorder
            .add_note(NoteDraft::new(NoteType::Note, "slow list"))
            .unwrap();

        assert_eq!(first.app, "UCL");
        assert_eq!(first.os, NONE_TAG);
        assert_eq!(recorder.notes().len(), 2);
        assert_ne!(recorder.notes()[0].id, recorder.notes()[1].id);
        assert_ne!(recorder.notes()[0].id, recorder.session_id());
    }

    #[tokio::test]
    async fn test_blank_note_is_rejected() {
        let mut recorder = SessionRecorder::start(store()).unwrap();

        let err = recorder
            .add_note(NoteDraft::new(NoteType::Note, "   "))
            .unwrap_err();

        assert!(err.is_validation());
        assert!(recorder.notes().is_empty());
    }

    #[tokio::test]
    async fn test_save_requires_name() {
        let store = store();
        let mut recorder = SessionRecorder::start(store.clone()).unwrap();
        recorder
            .add_note(NoteDraft::new(NoteType::Note, "something"))
            .unwrap();

        recorder.set_name("  ");
        assert!(recorder.save().unwrap_err().is_validation());
        assert!(store.list().is_empty());
        assert!(!recorder.is_saved());

        recorder.set_name("Login flow");
        let saved = recorder.save().unwrap();
        assert_eq!(store.list(), vec![saved]);
    }

    #[tokio::test]
    async fn test_second_save_replaces_in_place() {
        let store = store();
        store.add(Session::new("other", "Other")).unwrap();
        let mut recorder = SessionRecorder::start(store.clone()).unwrap();
        recorder.set_name("Draft");

        let first = recorder.save().unwrap();
        recorder
            .add_note(NoteDraft::new(NoteType::Question, "why?"))
            .unwrap();
        let second = recorder.save().unwrap();

        let sessions = store.list();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].id, first.id);
        assert_eq!(sessions[1].notes.len(), 1);
        assert_eq!(second.date, first.date);
    }

    #[tokio::test]
    async fn test_resave_keeps_sessions_written_by_other_handles() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mine = Arc::new(JsonSessionStore::new(temp_dir.path()));
        let other = JsonSessionStore::new(temp_dir.path());

        let mut recorder = SessionRecorder::start(mine).unwrap();
        recorder.set_name("Mine");
        let first = recorder.save().unwrap();

        other.add(Session::new("theirs", "Theirs")).unwrap();
        recorder
            .add_note(NoteDraft::new(NoteType::Question, "later"))
            .unwrap();
        recorder.save().unwrap();

        let sessions = other.list();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, first.id);
        assert_eq!(sessions[0].notes.len(), 1);
        assert_eq!(sessions[1].id, "theirs");
    }

    #[tokio::test]
    async fn test_open_resumes_stored_session() {
        let store = store();
        let mut stored = Session::new("s1", "Stored");
        stored.duration = 42;
        stored.notes.push(
            Note::from_draft("n1", NoteDraft::new(NoteType::Retest, "again")).unwrap(),
        );
        store.add(stored.clone()).unwrap();

        let mut recorder = SessionRecorder::open(store.clone(), "s1").unwrap();
        assert_eq!(recorder.name(), "Stored");
        assert_eq!(recorder.elapsed(), 42);

        let note = recorder
            .add_note(NoteDraft::new(NoteType::Note, "more"))
            .unwrap();
        assert_ne!(note.id, "n1");
        assert_ne!(note.id, "s1");

        let saved = recorder.save().unwrap();
        assert_eq!(saved.date, stored.date);
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.get("s1").unwrap().notes.len(), 2);
    }

    #[tokio::test]
    async fn test_open_missing_session() {
        let result = SessionRecorder::open(store(), "missing");
        assert!(matches!(result, Err(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_close_discards_draft() {
        let store = store();
        let mut recorder = SessionRecorder::start(store.clone()).unwrap();
        recorder.set_name("Never saved");
        recorder.close();
        assert!(store.list().is_empty());
    }
}
