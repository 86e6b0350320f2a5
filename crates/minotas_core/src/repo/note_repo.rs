//! SQLite note repository (relational strategy).
//!
//! # Responsibility
//! - Persist notes in the `notas` table with one parameterized statement per
//!   operation.
//!
//! # Invariants
//! - Ids come from `AUTOINCREMENT` and are never reused after deletion.
//! - `list_notes` returns rows in insertion (`id`) order.
//! - Zero affected rows on update/delete is a no-op, not `NotFound`.

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{Category, Note, NoteId};
use crate::repo::{NoteRepository, RepoError, RepoResult};
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use std::path::Path;

const NOTE_SELECT_SQL: &str = "SELECT id, categoria, contenido FROM notas ORDER BY id ASC;";

/// SQLite-backed note repository.
pub struct SqliteNoteRepository {
    conn: Connection,
}

impl SqliteNoteRepository {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a throwaway in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps a migrated connection after checking the required table shape.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_notes_table_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Gives tests and tooling access to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn add_note(&self, category: Category, content: &str) -> RepoResult<NoteId> {
        self.conn.execute(
            "INSERT INTO notas (categoria, contenido) VALUES (?1, ?2);",
            params![category.as_str(), content],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("event=note_add module=repo status=ok backend=sqlite note_id={id}");
        Ok(id)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(NOTE_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn update_note(&self, id: NoteId, category: Category, content: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notas SET categoria = ?1, contenido = ?2 WHERE id = ?3;",
            params![category.as_str(), content, id],
        )?;
        log_mutation("note_update", id, changed);
        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notas WHERE id = ?1;", [id])?;
        log_mutation("note_delete", id, changed);
        Ok(())
    }
}

fn log_mutation(event: &str, id: NoteId, changed: usize) {
    if changed == 0 {
        debug!("event={event} module=repo status=noop backend=sqlite note_id={id}");
    } else {
        info!("event={event} module=repo status=ok backend=sqlite note_id={id}");
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: NoteId = row.get("id")?;
    let label: String = row.get("categoria")?;
    let category = Category::parse(&label).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{label}` in notas.categoria for id {id}"
        ))
    })?;

    Ok(Note {
        id,
        category,
        content: row.get("contenido")?,
    })
}

fn ensure_notes_table_ready(conn: &Connection) -> RepoResult<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(notas);")?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }

    if columns.is_empty() {
        return Err(RepoError::InvalidData(
            "required table `notas` is missing".to_string(),
        ));
    }
    for required in ["id", "categoria", "contenido"] {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::InvalidData(format!(
                "required column `notas.{required}` is missing"
            )));
        }
    }
    Ok(())
}
