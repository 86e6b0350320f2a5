//! Domain model for categorized notes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Notes form a flat collection: no relations, no soft-delete, no history.

pub mod note;
