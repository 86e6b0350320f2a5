//! Note repository contract and its two storage strategies.
//!
//! # Responsibility
//! - Define the uniform note CRUD contract (`NoteRepository`).
//! - Isolate SQL and key-value encoding details from service orchestration.
//!
//! # Invariants
//! - `update_note`/`delete_note` on a missing id are no-ops, never errors,
//!   in every implementation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories do not validate note content; services do.

use crate::kv::KvError;
use crate::model::note::{Category, Note, NoteId};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[cfg(feature = "sqlite")]
use crate::db::DbError;

pub mod kv_note_repo;
#[cfg(feature = "sqlite")]
pub mod note_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage failure for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    #[cfg(feature = "sqlite")]
    Db(DbError),
    Kv(KvError),
    /// Fallback slot could not be encoded or decoded.
    Codec(serde_json::Error),
    InvalidData(String),
    /// Blocking storage task was cancelled or panicked.
    Task(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Db(err) => write!(f, "{err}"),
            Self::Kv(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "invalid notes slot encoding: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Task(message) => write!(f, "storage task failed: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Db(err) => Some(err),
            Self::Kv(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::InvalidData(_) | Self::Task(_) => None,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<KvError> for RepoError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value)
    }
}

/// Repository interface for note CRUD operations.
pub trait NoteRepository {
    /// Appends one note and returns its storage-assigned id.
    fn add_note(&self, category: Category, content: &str) -> RepoResult<NoteId>;
    /// Returns every stored note in storage iteration order.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    /// Replaces both fields of the note with `id`. Missing ids are a no-op.
    fn update_note(&self, id: NoteId, category: Category, content: &str) -> RepoResult<()>;
    /// Removes the note with `id`. Missing ids are a no-op.
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
}
