//! Persistence adapter: strategy selection plus the async note CRUD surface.
//!
//! # Responsibility
//! - Pick exactly one storage strategy per process from platform capability.
//! - Expose `add`/`list`/`update`/`delete` as async operations that run the
//!   blocking storage work off the async executor.
//!
//! # Invariants
//! - `StorageBackend::detect()` is decided at compile time and never changes
//!   while the process runs.
//! - Each adapter call opens (or creates) the active store, performs one
//!   operation, and drops the handle.

use crate::config::StorageConfig;
use crate::kv::FileKeyValueStore;
use crate::model::note::{Category, Note, NoteId};
use crate::repo::kv_note_repo::KvNoteRepository;
use crate::repo::{NoteRepository, RepoError, RepoResult};
use log::{debug, error};
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[cfg(feature = "sqlite")]
use crate::repo::note_repo::SqliteNoteRepository;

/// Storage strategy available on the current platform build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Embedded SQLite database (`notas` table).
    Sqlite,
    /// Single JSON slot in a persistent key-value store.
    KeyValue,
}

impl StorageBackend {
    /// Returns the strategy this build supports.
    ///
    /// Builds with the bundled SQLite engine (`sqlite` feature) always use the
    /// relational strategy; other builds use the key-value fallback.
    pub const fn detect() -> Self {
        if cfg!(feature = "sqlite") {
            Self::Sqlite
        } else {
            Self::KeyValue
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::KeyValue => "kv",
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opened note store for the active strategy.
pub enum NoteStore {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteNoteRepository),
    KeyValue(KvNoteRepository<FileKeyValueStore>),
}

impl NoteStore {
    pub fn backend(&self) -> StorageBackend {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => StorageBackend::Sqlite,
            Self::KeyValue(_) => StorageBackend::KeyValue,
        }
    }

    fn repo(&self) -> &dyn NoteRepository {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(repo) => repo,
            Self::KeyValue(repo) => repo,
        }
    }
}

impl NoteRepository for NoteStore {
    fn add_note(&self, category: Category, content: &str) -> RepoResult<NoteId> {
        self.repo().add_note(category, content)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        self.repo().list_notes()
    }

    fn update_note(&self, id: NoteId, category: Category, content: &str) -> RepoResult<()> {
        self.repo().update_note(id, category, content)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        self.repo().delete_note(id)
    }
}

/// Opens the store for the detected backend.
pub fn open_note_store(config: &StorageConfig) -> RepoResult<NoteStore> {
    open_note_store_with(StorageBackend::detect(), config)
}

/// Opens the store for an explicit backend.
///
/// Requesting `Sqlite` on a build without the engine falls back to the
/// key-value strategy.
pub fn open_note_store_with(
    backend: StorageBackend,
    config: &StorageConfig,
) -> RepoResult<NoteStore> {
    match backend {
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite => Ok(NoteStore::Sqlite(SqliteNoteRepository::open(
            &config.db_path,
        )?)),
        _ => {
            let store = FileKeyValueStore::open(&config.kv_dir)?;
            Ok(NoteStore::KeyValue(KvNoteRepository::with_key(
                store,
                config.kv_key.clone(),
            )))
        }
    }
}

/// Async note CRUD facade over the active storage strategy.
///
/// Callers are expected to await each call before issuing the next one; the
/// adapter adds no locking of its own.
#[derive(Debug, Clone)]
pub struct NotesAdapter {
    config: StorageConfig,
    backend: StorageBackend,
}

impl NotesAdapter {
    /// Creates an adapter bound to the detected backend.
    pub fn new(config: StorageConfig) -> Self {
        Self::with_backend(StorageBackend::detect(), config)
    }

    /// Creates an adapter bound to an explicit backend.
    pub fn with_backend(backend: StorageBackend, config: StorageConfig) -> Self {
        debug!(
            "event=storage_select module=storage status=ok backend={}",
            backend
        );
        Self { config, backend }
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Appends a note. Content is stored as given; validation belongs to callers.
    pub async fn add(&self, category: Category, content: impl Into<String>) -> RepoResult<NoteId> {
        let content = content.into();
        self.run("note_add", move |store| store.add_note(category, &content))
            .await
    }

    /// Lists all notes in storage iteration order.
    pub async fn list(&self) -> RepoResult<Vec<Note>> {
        self.run("note_list", |store| store.list_notes()).await
    }

    /// Replaces both fields of note `id`. Missing ids are a no-op.
    pub async fn update(
        &self,
        id: NoteId,
        category: Category,
        content: impl Into<String>,
    ) -> RepoResult<()> {
        let content = content.into();
        self.run("note_update", move |store| {
            store.update_note(id, category, &content)
        })
        .await
    }

    /// Deletes note `id`. Missing ids are a no-op.
    pub async fn delete(&self, id: NoteId) -> RepoResult<()> {
        self.run("note_delete", move |store| store.delete_note(id))
            .await
    }

    async fn run<T, F>(&self, event: &'static str, op: F) -> RepoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&NoteStore) -> RepoResult<T> + Send + 'static,
    {
        let config = self.config.clone();
        let backend = self.backend;
        let started_at = Instant::now();

        let joined = tokio::task::spawn_blocking(move || {
            let store = open_note_store_with(backend, &config)?;
            op(&store)
        })
        .await;

        let result = match joined {
            Ok(result) => result,
            Err(err) => Err(RepoError::Task(err.to_string())),
        };
        if let Err(err) = &result {
            error!(
                "event={} module=storage status=error backend={} duration_ms={} error={}",
                event,
                backend,
                started_at.elapsed().as_millis(),
                err
            );
        }
        result
    }
}
