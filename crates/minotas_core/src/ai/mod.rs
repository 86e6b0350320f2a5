//! AI gateway: note assistance through a remote generative-text endpoint.
//!
//! # Responsibility
//! - Turn note use-cases (summary, category, natural-language search) into
//!   prompts for one `generateContent` endpoint.
//! - Report every result as an `AiOutcome`; nothing here returns `Err` or
//!   panics.
//!
//! # Invariants
//! - One canonical request shape for all operations.
//! - Search over zero notes never touches the network.
//! - No automatic retries.

mod client;
mod outcome;
mod prompt;

pub use client::{classify_body, GenerateContentRequest, GenerateContentResponse, GenerativeClient};
pub use outcome::{
    AiOperation, AiOutcome, GENERATE_FAILED_TEXT, NO_NOTES_TEXT, RATE_LIMITED_TEXT,
    SEARCH_EMPTY_TEXT, SEARCH_FAILED_TEXT, SUMMARY_FAILED_TEXT,
};
pub use prompt::{category_prompt, search_prompt, summarize_prompt};

use crate::config::{AiConfig, ConfigError};
use crate::model::note::{Category, Note};
use log::{debug, info};

/// Note-assistant facade over the generative client.
#[derive(Debug, Clone)]
pub struct AiGateway {
    client: GenerativeClient,
}

impl AiGateway {
    pub fn new(config: AiConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: GenerativeClient::new(config)?,
        })
    }

    /// Builds the gateway from `MINOTAS_AI_*` variables, failing fast when
    /// the API key is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(AiConfig::from_env()?)
    }

    pub fn config(&self) -> &AiConfig {
        self.client.config()
    }

    /// Sends a raw prompt.
    pub async fn generate_text(&self, prompt: &str) -> AiOutcome {
        self.client
            .generate(AiOperation::GenerateText.as_str(), prompt.to_string())
            .await
    }

    /// Asks for a shorter version of `content`.
    pub async fn summarize_note(&self, content: &str) -> AiOutcome {
        self.client
            .generate(
                AiOperation::SummarizeNote.as_str(),
                summarize_prompt(content),
            )
            .await
    }

    /// Asks which category fits `content`. The reply is raw model text and
    /// may name no valid category; see [`Self::suggest_category_checked`].
    pub async fn suggest_category(&self, content: &str) -> AiOutcome {
        self.client
            .generate(
                AiOperation::SuggestCategory.as_str(),
                category_prompt(content),
            )
            .await
    }

    /// Like [`Self::suggest_category`], but re-validated against the fixed
    /// category set. Falls back to `Category::default()` on any mismatch or
    /// failure.
    pub async fn suggest_category_checked(&self, content: &str) -> Category {
        let outcome = self.suggest_category(content).await;
        match outcome.text().and_then(Category::from_model_reply) {
            Some(category) => category,
            None => {
                info!(
                    "event=ai_suggest_category module=ai status=fallback outcome={} category={}",
                    outcome.kind(),
                    Category::default()
                );
                Category::default()
            }
        }
    }

    /// Asks the model which of `notes` relate to `query`.
    ///
    /// Returns `AiOutcome::NoNotes` without any request when `notes` is
    /// empty. A successful reply is free text, not a list of ids; use
    /// [`filter_notes_by_reply`] to map it back onto notes.
    pub async fn search_notes_natural(&self, query: &str, notes: &[Note]) -> AiOutcome {
        if notes.is_empty() {
            debug!("event=ai_request module=ai status=skipped operation=search_notes reason=no_notes");
            return AiOutcome::NoNotes;
        }
        self.client
            .generate(
                AiOperation::SearchNotes.as_str(),
                search_prompt(query, notes),
            )
            .await
    }
}

/// Keeps notes whose trimmed content appears in `reply`, ignoring case.
///
/// This is a fuzzy filter: the model may paraphrase, in which case a related
/// note is dropped.
pub fn filter_notes_by_reply(reply: &str, notes: &[Note]) -> Vec<Note> {
    let haystack = reply.to_lowercase();
    notes
        .iter()
        .filter(|note| {
            let needle = note.content.trim().to_lowercase();
            !needle.is_empty() && haystack.contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::filter_notes_by_reply;
    use crate::model::note::{Category, Note};

    #[test]
    fn reply_filter_keeps_notes_quoted_by_model() {
        let notes = vec![
            Note::new(1, Category::Personal, "Comprar leche"),
            Note::new(2, Category::Trabajo, "Enviar informe"),
            Note::new(3, Category::Ideas, "App de recetas"),
        ];
        let reply = "Las notas relacionadas son:\n- Personal: comprar leche\n- Ideas: App de recetas";
        let ids: Vec<_> = filter_notes_by_reply(reply, &notes)
            .iter()
            .map(|note| note.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn reply_filter_misses_paraphrased_notes() {
        let notes = vec![Note::new(1, Category::Personal, "Comprar leche")];
        assert!(filter_notes_by_reply("Deberías ir al súper por lácteos", &notes).is_empty());
    }
}
