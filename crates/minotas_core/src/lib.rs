//! Core domain logic for MiNotas.
//! This crate is the single source of truth for business invariants.

pub mod ai;
pub mod config;
#[cfg(feature = "sqlite")]
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use ai::{filter_notes_by_reply, AiGateway, AiOperation, AiOutcome};
pub use config::{AiConfig, ConfigError, StorageConfig};
pub use kv::{FileKeyValueStore, KeyValueStore, KvError, MemoryKeyValueStore};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::note::{validate_content, Category, Note, NoteId, NoteValidationError};
pub use repo::kv_note_repo::KvNoteRepository;
pub use repo::{NoteRepository, RepoError, RepoResult};
pub use service::note_service::{filter_notes_by_category, NoteService, NoteServiceError};
pub use storage::{open_note_store, NoteStore, NotesAdapter, StorageBackend};

#[cfg(feature = "sqlite")]
pub use repo::note_repo::SqliteNoteRepository;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
