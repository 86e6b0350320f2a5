//! Tagged result of one AI gateway operation.

use std::fmt::{Display, Formatter};

pub const GENERATE_FAILED_TEXT: &str = "Error al generar texto.";
pub const SUMMARY_FAILED_TEXT: &str = "No se pudo resumir la nota.";
pub const SEARCH_FAILED_TEXT: &str = "Error al buscar notas.";
pub const SEARCH_EMPTY_TEXT: &str = "No se encontraron notas relacionadas.";
pub const NO_NOTES_TEXT: &str = "No hay notas guardadas.";
pub const RATE_LIMITED_TEXT: &str =
    "Has alcanzado el límite de solicitudes de IA. Espera un momento e inténtalo de nuevo.";

/// Gateway operation, used to pick user-facing fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiOperation {
    GenerateText,
    SummarizeNote,
    SuggestCategory,
    SearchNotes,
}

impl AiOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateText => "generate_text",
            Self::SummarizeNote => "summarize_note",
            Self::SuggestCategory => "suggest_category",
            Self::SearchNotes => "search_notes",
        }
    }

    fn failure_text(self) -> &'static str {
        match self {
            Self::GenerateText | Self::SuggestCategory => GENERATE_FAILED_TEXT,
            Self::SummarizeNote => SUMMARY_FAILED_TEXT,
            Self::SearchNotes => SEARCH_FAILED_TEXT,
        }
    }
}

/// Outcome of an AI call. Failures are values, never errors or panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiOutcome {
    /// Non-blank model text.
    Ok(String),
    /// Well-formed response whose text is blank.
    Empty,
    /// Search was asked over an empty collection; no request was sent.
    NoNotes,
    /// Endpoint answered HTTP 429.
    RateLimited,
    /// Network failure, timeout, or a non-429 HTTP error status.
    TransportError(String),
    /// Body is not JSON or lacks `candidates[0].content.parts[0].text`.
    MalformedResponse(String),
}

impl AiOutcome {
    /// Short stable tag, e.g. for FFI envelopes and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ok(_) => "ok",
            Self::Empty => "empty",
            Self::NoNotes => "no_notes",
            Self::RateLimited => "rate_limited",
            Self::TransportError(_) => "transport_error",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Model text when the call succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Ok(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Text to show the user for this outcome of `operation`.
    pub fn display_text(&self, operation: AiOperation) -> String {
        match (self, operation) {
            (Self::Ok(text), _) => text.clone(),
            (Self::RateLimited, _) => RATE_LIMITED_TEXT.to_string(),
            (Self::NoNotes, _) => NO_NOTES_TEXT.to_string(),
            (Self::Empty, AiOperation::SearchNotes) => SEARCH_EMPTY_TEXT.to_string(),
            (_, operation) => operation.failure_text().to_string(),
        }
    }
}

impl Display for AiOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok(text) => write!(f, "ok: {} chars", text.chars().count()),
            Self::TransportError(detail) => write!(f, "transport error: {detail}"),
            Self::MalformedResponse(detail) => write!(f, "malformed response: {detail}"),
            other => f.write_str(other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AiOperation, AiOutcome, GENERATE_FAILED_TEXT, NO_NOTES_TEXT, RATE_LIMITED_TEXT,
        SEARCH_EMPTY_TEXT, SUMMARY_FAILED_TEXT,
    };

    #[test]
    fn rate_limit_text_is_distinct_from_generic_failure() {
        let rate = AiOutcome::RateLimited.display_text(AiOperation::SummarizeNote);
        let generic =
            AiOutcome::TransportError("HTTP 500".into()).display_text(AiOperation::SummarizeNote);
        assert_eq!(rate, RATE_LIMITED_TEXT);
        assert_eq!(generic, SUMMARY_FAILED_TEXT);
        assert_ne!(rate, generic);
    }

    #[test]
    fn search_outcomes_map_to_search_texts() {
        assert_eq!(
            AiOutcome::NoNotes.display_text(AiOperation::SearchNotes),
            NO_NOTES_TEXT
        );
        assert_eq!(
            AiOutcome::Empty.display_text(AiOperation::SearchNotes),
            SEARCH_EMPTY_TEXT
        );
        assert_eq!(
            AiOutcome::MalformedResponse("x".into()).display_text(AiOperation::GenerateText),
            GENERATE_FAILED_TEXT
        );
    }

    #[test]
    fn ok_outcome_passes_model_text_through() {
        let outcome = AiOutcome::Ok("Trabajo".into());
        assert!(outcome.is_ok());
        assert_eq!(outcome.text(), Some("Trabajo"));
        assert_eq!(outcome.display_text(AiOperation::SuggestCategory), "Trabajo");
        assert_eq!(outcome.kind(), "ok");
    }
}
