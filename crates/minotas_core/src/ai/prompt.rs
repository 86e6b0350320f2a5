//! Prompt templates for the note assistant.

use crate::model::note::Note;

/// Asks for a shorter version of one note.
pub fn summarize_prompt(content: &str) -> String {
    format!("Resume esta nota en una versión más corta:\n\n\"{content}\"")
}

/// Asks which fixed category fits one note, answering with the label only.
pub fn category_prompt(content: &str) -> String {
    format!(
        "A qué categoría pertenece esta nota? Opciones: Personal, Trabajo, Ideas, Recordatorios. Solo responde con la categoría:\n\n\"{content}\""
    )
}

/// Lists every note as `- {categoria}: {contenido}` and asks for the ones
/// related to `query`.
pub fn search_prompt(query: &str, notes: &[Note]) -> String {
    let listing = notes
        .iter()
        .map(|note| format!("- {}: {}", note.category, note.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Tengo las siguientes notas:\n{listing}\n\nEncuentra las notas más relacionadas con:\n\"{query}\""
    )
}
