use crate::store::{DurableStore, StorageError};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const NOTES_KEY: &str = "notes";

pub const TITLE_MAX_CHARS: usize = 30;
const FALLBACK_TITLE: &str = "Untitled note";

#[derive(Debug)]
pub enum NoteStoreError {
    Storage(StorageError),
    Serde(serde_json::Error),
}

impl From<StorageError> for NoteStoreError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<serde_json::Error> for NoteStoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub updated_at: i64,
}

/// First line of the content, truncated to [`TITLE_MAX_CHARS`]. An empty
/// first line falls back to a placeholder.
pub fn derive_title(content: &str) -> String {
    let first_line = content.split('\n').next().unwrap_or("");
    let title: String = first_line.chars().take(TITLE_MAX_CHARS).collect();
    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}

pub struct NoteStore<S> {
    store: S,
}

impl<S: DurableStore> NoteStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Reads the whole persisted collection. An absent or empty blob is the
    /// first-run state and yields an empty collection. A blob that no longer
    /// deserializes is logged and treated as empty rather than failing the
    /// session; the stored bytes stay untouched until the next write.
    pub fn load_all(&self) -> Result<Vec<Note>, NoteStoreError> {
        let Some(raw) = self.store.get(NOTES_KEY)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str(&raw) {
            Ok(notes) => Ok(notes),
            Err(err) => {
                warn!("discarding malformed notes collection: {err}");
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the note with the same id in place, or appends a new one,
    /// then writes the whole collection back. Returns the updated collection.
    pub fn upsert(&mut self, note: Note) -> Result<Vec<Note>, NoteStoreError> {
        let mut notes = self.load_all()?;
        match notes.iter_mut().find(|existing| existing.id == note.id) {
            Some(slot) => *slot = note,
            None => notes.push(note),
        }
        self.write_back(&notes)?;
        Ok(notes)
    }

    /// Removes the note with the given id, preserving the relative order of
    /// the rest. Deleting an id that is not present is a caller bug.
    pub fn delete(&mut self, id: &str) -> Result<Vec<Note>, NoteStoreError> {
        let mut notes = self.load_all()?;
        let before = notes.len();
        notes.retain(|note| note.id != id);
        assert!(notes.len() < before, "delete: unknown note id {id}");
        self.write_back(&notes)?;
        Ok(notes)
    }

    fn write_back(&mut self, notes: &[Note]) -> Result<(), NoteStoreError> {
        let data = serde_json::to_string(notes)?;
        self.store.set(NOTES_KEY, &data)?;
        Ok(())
    }
}
