//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted record (`Note`) and its fixed category set.
//! - Provide content validation shared by service and FFI layers.
//!
//! # Invariants
//! - `id` is assigned by the storage backend and never reassigned.
//! - `categoria` is always one of the four `Category` values.
//! - `contenido` is non-empty after trimming whitespace.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static CATEGORY_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(personal|trabajo|ideas|recordatorios)\b").expect("valid category regex")
});

/// Storage-assigned note identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = i64;

/// Fixed category set offered by the note editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Default selection for new notes.
    #[default]
    Personal,
    Trabajo,
    Ideas,
    Recordatorios,
}

impl Category {
    /// All categories in editor order.
    pub const ALL: [Category; 4] = [
        Category::Personal,
        Category::Trabajo,
        Category::Ideas,
        Category::Recordatorios,
    ];

    /// Returns the persisted label (`notas.categoria` value).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Trabajo => "Trabajo",
            Self::Ideas => "Ideas",
            Self::Recordatorios => "Recordatorios",
        }
    }

    /// Parses a label case-insensitively after trimming.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// Extracts a category from free-form model output.
    ///
    /// Exact label match wins; otherwise the first whole-word label found in
    /// the text is used. Returns `None` when the reply names no category.
    pub fn from_model_reply(reply: &str) -> Option<Self> {
        let cleaned = reply.trim().trim_matches(|c: char| c.is_ascii_punctuation() || c == '"');
        if let Some(exact) = Self::parse(cleaned) {
            return Some(exact);
        }

        CATEGORY_WORD_RE
            .captures(reply)
            .and_then(|caps| caps.get(1))
            .and_then(|m| Self::parse(m.as_str()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted note record.
///
/// Field names are serialized with the storage schema names so the key-value
/// fallback slot and the `notas` table share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(rename = "categoria")]
    pub category: Category,
    #[serde(rename = "contenido")]
    pub content: String,
}

impl Note {
    pub fn new(id: NoteId, category: Category, content: impl Into<String>) -> Self {
        Self {
            id,
            category,
            content: content.into(),
        }
    }
}

/// Validation errors for note input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Content is empty or whitespace-only.
    EmptyContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "note content cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Checks note content before it reaches storage.
pub fn validate_content(content: &str) -> Result<(), NoteValidationError> {
    if content.trim().is_empty() {
        return Err(NoteValidationError::EmptyContent);
    }
    Ok(())
}
