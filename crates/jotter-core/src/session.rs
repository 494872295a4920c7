use crate::format::{apply_action, FormatAction, Selection};
use crate::notes::{derive_title, Note, NoteStore, NoteStoreError};
use crate::store::DurableStore;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Editing,
    Committed,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Committed(Note),
    Discarded,
}

/// One editing session over a single note buffer. Constructed in the
/// `Editing` phase; `save` and `cancel` end it. A session performs at most
/// one repository write, and only on a successful save.
#[derive(Debug, Clone)]
pub struct EditSession {
    note_id: Option<String>,
    buffer: String,
    selection: Selection,
    phase: SessionPhase,
}

impl EditSession {
    pub fn blank() -> Self {
        Self {
            note_id: None,
            buffer: String::new(),
            selection: Selection::caret(0),
            phase: SessionPhase::Editing,
        }
    }

    pub fn edit(note: &Note) -> Self {
        Self {
            note_id: Some(note.id.clone()),
            buffer: note.content.clone(),
            selection: Selection::caret(0),
            phase: SessionPhase::Editing,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn note_id(&self) -> Option<&str> {
        self.note_id.as_deref()
    }

    /// Replaces the buffer with the host's live text and selection, e.g.
    /// after the user types.
    pub fn set_buffer(&mut self, buffer: String, selection: Selection) {
        self.assert_editing();
        self.selection = clamp_selection(&buffer, selection);
        self.buffer = buffer;
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.assert_editing();
        self.selection = clamp_selection(&self.buffer, selection);
    }

    /// Runs one toolbar action through the formatting engine. When the
    /// engine does not decide the next caret, the current selection is
    /// clamped to the new buffer.
    pub fn apply(&mut self, action: FormatAction) {
        self.assert_editing();
        let outcome = apply_action(&self.buffer, self.selection, action);
        self.buffer = outcome.text;
        self.selection = match outcome.selection {
            Some(selection) => selection,
            None => clamp_selection(&self.buffer, self.selection),
        };
    }

    pub fn save<S: DurableStore>(
        &mut self,
        notes: &mut NoteStore<S>,
    ) -> Result<SaveOutcome, NoteStoreError> {
        self.save_at(notes, Utc::now())
    }

    /// Saving a whitespace-only buffer discards the session without touching
    /// the repository. On a write failure the session stays in `Editing` so
    /// the host can retry.
    pub fn save_at<S: DurableStore>(
        &mut self,
        notes: &mut NoteStore<S>,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, NoteStoreError> {
        self.assert_editing();
        if self.buffer.trim().is_empty() {
            self.phase = SessionPhase::Abandoned;
            return Ok(SaveOutcome::Discarded);
        }

        let note = Note {
            id: self
                .note_id
                .clone()
                .unwrap_or_else(|| Uuid::now_v7().to_string()),
            title: derive_title(&self.buffer),
            content: self.buffer.clone(),
            updated_at: now.timestamp_millis(),
        };
        notes.upsert(note.clone())?;
        self.phase = SessionPhase::Committed;
        Ok(SaveOutcome::Committed(note))
    }

    pub fn cancel(&mut self) {
        self.assert_editing();
        self.phase = SessionPhase::Abandoned;
    }

    fn assert_editing(&self) {
        assert!(
            self.phase == SessionPhase::Editing,
            "session already ended"
        );
    }
}

fn clamp_selection(text: &str, selection: Selection) -> Selection {
    let mut end = selection.end.min(text.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut start = selection.start.min(end);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    Selection { start, end }
}

#[cfg(test)]
mod tests {
    use super::{EditSession, SaveOutcome, SessionPhase};
    use crate::format::{FormatAction, Selection};
    use crate::notes::{derive_title, Note, NoteStore, NOTES_KEY};
    use crate::store::{DurableStore, MemoryStore};
    use chrono::{TimeZone, Utc};

    fn note(id: &str, content: &str) -> Note {
        Note {
            id: id.to_string(),
            title: derive_title(content),
            content: content.to_string(),
            updated_at: 0,
        }
    }

    #[test]
    fn apply_formats_buffer_and_moves_caret() {
        let mut session = EditSession::blank();
        session.set_buffer("hello".to_string(), Selection::caret(5));
        session.apply(FormatAction::Bold);

        assert_eq!(session.buffer(), "hello****");
        assert_eq!(session.selection(), Selection::caret(7));
    }

    #[test]
    fn toggle_off_clamps_selection_to_shrunk_buffer() {
        let mut session = EditSession::blank();
        session.set_buffer("**bold**".to_string(), Selection::new(0, 8));
        session.apply(FormatAction::Bold);

        assert_eq!(session.buffer(), "bold");
        assert_eq!(session.selection(), Selection::new(0, 4));
    }

    #[test]
    fn save_commits_note_with_derived_title() {
        let mut notes = NoteStore::new(MemoryStore::new());
        let mut session = EditSession::blank();
        session.set_buffer("Groceries\nmilk".to_string(), Selection::caret(0));

        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let outcome = session.save_at(&mut notes, now).expect("save");

        let SaveOutcome::Committed(saved) = outcome else {
            panic!("expected commit");
        };
        assert_eq!(saved.title, "Groceries");
        assert_eq!(saved.updated_at, 1_700_000_000_000);
        assert_eq!(session.phase(), SessionPhase::Committed);

        let stored = notes.load_all().expect("load");
        assert_eq!(stored, vec![saved]);
    }

    #[test]
    fn save_empty_buffer_discards_without_writing() {
        let mut notes = NoteStore::new(MemoryStore::new());
        let mut session = EditSession::blank();
        session.set_buffer("  \n ".to_string(), Selection::caret(0));

        let outcome = session.save(&mut notes).expect("save");
        assert_eq!(outcome, SaveOutcome::Discarded);
        assert_eq!(session.phase(), SessionPhase::Abandoned);
        assert!(notes
            .into_inner()
            .get(NOTES_KEY)
            .expect("get")
            .is_none());
    }

    #[test]
    fn editing_existing_note_keeps_id_and_position() {
        let mut notes = NoteStore::new(MemoryStore::new());
        notes.upsert(note("a", "first")).expect("upsert");
        notes.upsert(note("b", "second")).expect("upsert");

        let existing = notes.load_all().expect("load")[0].clone();
        let mut session = EditSession::edit(&existing);
        session.set_buffer("first, revised".to_string(), Selection::caret(0));
        session.save(&mut notes).expect("save");

        let stored = notes.load_all().expect("load");
        let ids: Vec<&str> = stored.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(stored[0].content, "first, revised");
    }

    #[test]
    fn first_save_assigns_a_fresh_id() {
        let mut notes = NoteStore::new(MemoryStore::new());
        let mut session = EditSession::blank();
        assert!(session.note_id().is_none());
        session.set_buffer("new note".to_string(), Selection::caret(0));

        let outcome = session.save(&mut notes).expect("save");
        let SaveOutcome::Committed(saved) = outcome else {
            panic!("expected commit");
        };
        assert!(!saved.id.is_empty());
    }

    #[test]
    fn cancel_ends_session_without_write() {
        let mut session = EditSession::blank();
        session.set_buffer("draft".to_string(), Selection::caret(0));
        session.cancel();
        assert_eq!(session.phase(), SessionPhase::Abandoned);
    }

    #[test]
    #[should_panic(expected = "session already ended")]
    fn apply_after_save_is_fatal() {
        let mut notes = NoteStore::new(MemoryStore::new());
        let mut session = EditSession::blank();
        session.set_buffer("note".to_string(), Selection::caret(0));
        session.save(&mut notes).expect("save");
        session.apply(FormatAction::Bold);
    }
}
