//! Key-value note repository (fallback strategy).
//!
//! # Responsibility
//! - Persist the whole note collection as one JSON array in a single slot.
//!
//! # Invariants
//! - Every operation is read-decode-mutate-encode-write of the entire
//!   collection; cost is O(total notes size).
//! - A missing slot reads as an empty collection.
//! - New ids are epoch milliseconds, bumped past the current maximum id.
//! - Overlapping writers are last-writer-wins: there is no compare-and-swap,
//!   so one of two concurrent read-modify-write sequences can be lost.

use crate::kv::KeyValueStore;
use crate::model::note::{Category, Note, NoteId};
use crate::repo::{NoteRepository, RepoResult};
use log::{debug, info};
use std::time::{SystemTime, UNIX_EPOCH};

/// Slot name used when callers do not configure one.
pub const DEFAULT_NOTES_KEY: &str = "notas";

/// Note repository over a single key-value slot.
#[derive(Debug)]
pub struct KvNoteRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KvNoteRepository<S> {
    /// Creates a repository using the default `notas` slot.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_NOTES_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load(&self) -> RepoResult<Vec<Note>> {
        match self.store.get_item(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, notes: &[Note]) -> RepoResult<()> {
        let encoded = serde_json::to_string(notes)?;
        self.store.set_item(&self.key, &encoded)?;
        Ok(())
    }
}

impl<S: KeyValueStore> NoteRepository for KvNoteRepository<S> {
    fn add_note(&self, category: Category, content: &str) -> RepoResult<NoteId> {
        let mut notes = self.load()?;
        let id = next_note_id(&notes, epoch_millis());
        notes.push(Note::new(id, category, content));
        self.save(&notes)?;
        info!("event=note_add module=repo status=ok backend=kv note_id={id}");
        Ok(id)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        self.load()
    }

    fn update_note(&self, id: NoteId, category: Category, content: &str) -> RepoResult<()> {
        let mut notes = self.load()?;
        let Some(note) = notes.iter_mut().find(|note| note.id == id) else {
            debug!("event=note_update module=repo status=noop backend=kv note_id={id}");
            return Ok(());
        };
        note.category = category;
        note.content = content.to_string();
        self.save(&notes)?;
        info!("event=note_update module=repo status=ok backend=kv note_id={id}");
        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let mut notes = self.load()?;
        let before = notes.len();
        notes.retain(|note| note.id != id);
        if notes.len() == before {
            debug!("event=note_delete module=repo status=noop backend=kv note_id={id}");
            return Ok(());
        }
        self.save(&notes)?;
        info!("event=note_delete module=repo status=ok backend=kv note_id={id}");
        Ok(())
    }
}

/// Picks a timestamp-derived id that is unique within `notes`.
fn next_note_id(notes: &[Note], now_ms: i64) -> NoteId {
    let max_existing = notes.iter().map(|note| note.id).max().unwrap_or(0);
    now_ms.max(max_existing.saturating_add(1))
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{next_note_id, KvNoteRepository};
    use crate::kv::{KeyValueStore, MemoryKeyValueStore};
    use crate::model::note::{Category, Note};
    use crate::repo::{NoteRepository, RepoError};

    #[test]
    fn next_id_uses_clock_when_ahead() {
        let notes = vec![Note::new(10, Category::Personal, "a")];
        assert_eq!(next_note_id(&notes, 1_700_000_000_000), 1_700_000_000_000);
    }

    #[test]
    fn next_id_bumps_past_existing_when_clock_collides() {
        let notes = vec![Note::new(1_700_000_000_000, Category::Personal, "a")];
        assert_eq!(next_note_id(&notes, 1_700_000_000_000), 1_700_000_000_001);
        assert_eq!(next_note_id(&notes, 5), 1_700_000_000_001);
    }

    #[test]
    fn slot_holds_schema_shaped_json_array() {
        let repo = KvNoteRepository::new(MemoryKeyValueStore::new());
        let id = repo.add_note(Category::Trabajo, "informe").expect("add_note should succeed");

        let raw = repo
            .store()
            .get_item("notas")
            .expect("get_item should succeed")
            .expect("slot should be written");
        let decoded: serde_json::Value =
            serde_json::from_str(&raw).expect("slot should hold valid JSON");
        assert_eq!(decoded[0]["id"], id);
        assert_eq!(decoded[0]["categoria"], "Trabajo");
        assert_eq!(decoded[0]["contenido"], "informe");
    }

    #[test]
    fn corrupted_slot_surfaces_codec_error() {
        let store = MemoryKeyValueStore::new();
        store.set_item("notas", "{not json").expect("set_item should succeed");
        let repo = KvNoteRepository::new(store);

        let err = repo.list_notes().expect_err("list_notes should fail");
        assert!(matches!(err, RepoError::Codec(_)));
    }

    #[test]
    fn custom_slot_key_is_isolated_from_default() {
        let repo = KvNoteRepository::with_key(MemoryKeyValueStore::new(), "notas_archivo");
        repo.add_note(Category::Ideas, "idea").expect("add_note should succeed");
        assert_eq!(repo.store().get_item("notas").expect("get_item should succeed"), None);
        assert_eq!(repo.list_notes().expect("list_notes should succeed").len(), 1);
    }
}
