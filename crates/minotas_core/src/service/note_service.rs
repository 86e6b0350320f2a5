//! Note use-case service.
//!
//! # Responsibility
//! - Validate note input before it reaches the persistence adapter.
//! - Provide the local category quick-filter used by the notes list.
//!
//! # Invariants
//! - Content that is empty after trimming is never persisted through this
//!   service.
//! - Update/delete of a missing id stays a silent no-op (adapter contract).

use crate::model::note::{validate_content, Category, Note, NoteId, NoteValidationError};
use crate::repo::{RepoError, RepoResult};
use crate::storage::NotesAdapter;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Content is empty after trimming.
    EmptyContent,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "note content cannot be empty"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::EmptyContent => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        match value {
            NoteValidationError::EmptyContent => Self::EmptyContent,
        }
    }
}

/// Note service facade over the persistence adapter.
#[derive(Debug, Clone)]
pub struct NoteService {
    adapter: NotesAdapter,
}

impl NoteService {
    pub fn new(adapter: NotesAdapter) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &NotesAdapter {
        &self.adapter
    }

    /// Creates one note after validating its content.
    pub async fn create_note(
        &self,
        category: Category,
        content: impl Into<String>,
    ) -> Result<NoteId, NoteServiceError> {
        let content = content.into();
        reject_empty(&content, "note_create")?;
        Ok(self.adapter.add(category, content).await?)
    }

    /// Replaces category and content of note `id`.
    pub async fn update_note(
        &self,
        id: NoteId,
        category: Category,
        content: impl Into<String>,
    ) -> Result<(), NoteServiceError> {
        let content = content.into();
        reject_empty(&content, "note_update")?;
        Ok(self.adapter.update(id, category, content).await?)
    }

    pub async fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        self.adapter.delete(id).await
    }

    pub async fn list_notes(&self) -> RepoResult<Vec<Note>> {
        self.adapter.list().await
    }

    /// Lists notes whose category label contains `text` (case-insensitive).
    pub async fn filter_by_category(&self, text: &str) -> RepoResult<Vec<Note>> {
        let notes = self.adapter.list().await?;
        Ok(filter_notes_by_category(notes, text))
    }
}

/// Keeps notes whose category label contains `text`, ignoring case.
///
/// Only empty `text` keeps every note; whitespace is matched literally.
pub fn filter_notes_by_category(notes: Vec<Note>, text: &str) -> Vec<Note> {
    let needle = text.to_lowercase();
    if needle.is_empty() {
        return notes;
    }
    notes
        .into_iter()
        .filter(|note| note.category.as_str().to_lowercase().contains(&needle))
        .collect()
}

fn reject_empty(content: &str, event: &str) -> Result<(), NoteServiceError> {
    validate_content(content).map_err(|err| {
        warn!("event={event} module=service status=rejected reason=empty_content");
        NoteServiceError::from(err)
    })
}
