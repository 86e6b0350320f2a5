//! Persistent key-value slot storage for the fallback note strategy.
//!
//! # Responsibility
//! - Define the minimal string slot contract (`get_item`/`set_item`/`remove_item`).
//! - Provide file-backed and in-memory implementations.
//!
//! # Invariants
//! - A slot either holds the last fully written value or nothing.
//! - Keys are plain identifiers; path-like keys are rejected.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

pub type KvResult<T> = Result<T, KvError>;

#[derive(Debug)]
pub enum KvError {
    Io(std::io::Error),
    /// Key is empty or contains characters that cannot name a slot.
    InvalidKey(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "key-value store I/O failed: {err}"),
            Self::InvalidKey(key) => write!(f, "invalid key-value slot name `{key}`"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<std::io::Error> for KvError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// String slot store modeled after platform key-value storage.
pub trait KeyValueStore {
    /// Returns the slot value, or `None` when the slot was never written.
    fn get_item(&self, key: &str) -> KvResult<Option<String>>;
    /// Replaces the slot value.
    fn set_item(&self, key: &str, value: &str) -> KvResult<()>;
    /// Removes the slot. Missing slots are not an error.
    fn remove_item(&self, key: &str) -> KvResult<()>;
}

pub(crate) fn validate_key(key: &str) -> KvResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(KvError::InvalidKey(key.to_string()))
    }
}
