//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level note and AI functions to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Storage and AI calls are async on the Dart side; only trivial probes
//!   are `sync`.
//! - AI calls never fail: they return an outcome tag plus display text.

use minotas_core::{
    core_version as core_version_inner, filter_notes_by_category,
    init_logging as init_logging_inner, ping as ping_inner, AiConfig, AiGateway, AiOperation,
    AiOutcome, Category, Note, NoteService, NoteServiceError, NotesAdapter, StorageConfig,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{OnceLock, PoisonError, RwLock};

const AI_NOT_CONFIGURED_KIND: &str = "not_configured";

static STORAGE_CONFIG: OnceLock<StorageConfig> = OnceLock::new();
static AI_GATEWAY: RwLock<Option<AiGateway>> = RwLock::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Points note storage at the app data directory.
///
/// # FFI contract
/// - Must run before the first note call; later calls with the same
///   directory are accepted, different directories are rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(data_dir: String) -> String {
    let trimmed = data_dir.trim();
    if trimmed.is_empty() {
        return "data_dir cannot be empty".to_string();
    }
    let requested = StorageConfig::in_dir(PathBuf::from(trimmed));
    let active = STORAGE_CONFIG.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        warn!("event=configure_storage module=ffi status=error reason=already_configured");
        format!(
            "storage already configured at `{}`; refusing to switch",
            active.db_path.display()
        )
    }
}

/// Configures the AI gateway with an injected API key.
///
/// `base_url`/`model` override the defaults when present. Replaces any
/// previous configuration.
///
/// # FFI contract
/// - Fails fast: returns an error message when the key is missing or blank.
/// - Returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_ai(api_key: String, base_url: Option<String>, model: Option<String>) -> String {
    let gateway = match build_ai_config(api_key, base_url, model).and_then(AiGateway::new) {
        Ok(gateway) => gateway,
        Err(err) => {
            warn!("event=configure_ai module=ffi status=error error={}", err);
            return err.to_string();
        }
    };
    install_gateway(gateway);
    String::new()
}

/// Configures the AI gateway from `MINOTAS_AI_*` environment variables.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_ai_from_env() -> String {
    match AiGateway::from_env() {
        Ok(gateway) => {
            install_gateway(gateway);
            String::new()
        }
        Err(err) => {
            warn!("event=configure_ai module=ffi status=error source=env error={}", err);
            err.to_string()
        }
    }
}

/// Category labels in editor order.
#[flutter_rust_bridge::frb(sync)]
pub fn note_categories() -> Vec<String> {
    Category::ALL
        .iter()
        .map(|category| category.as_str().to_string())
        .collect()
}

/// One note as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: i64,
    pub categoria: String,
    pub contenido: String,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            categoria: note.category.as_str().to_string(),
            contenido: note.content,
        }
    }
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    pub items: Vec<NoteItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Generic action response envelope for note mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created note ID (add only).
    pub note_id: Option<i64>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: Option<i64>) -> Self {
        Self {
            ok: true,
            note_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// AI response: outcome tag plus text ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiResponse {
    /// `ok|empty|no_notes|rate_limited|transport_error|malformed_response|not_configured`.
    pub kind: String,
    pub text: String,
}

impl AiResponse {
    fn from_outcome(outcome: &AiOutcome, operation: AiOperation) -> Self {
        Self {
            kind: outcome.kind().to_string(),
            text: outcome.display_text(operation),
        }
    }
}

/// Natural-language search response: model reply plus matching notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSearchResponse {
    pub kind: String,
    pub text: String,
    /// Notes whose content appears in the reply (fuzzy).
    pub items: Vec<NoteItem>,
}

/// Creates a note.
///
/// # FFI contract
/// - Async call, storage-backed execution.
/// - Rejects unknown categories and blank content.
pub async fn notes_add(categoria: String, contenido: String) -> NoteActionResponse {
    let Some(category) = Category::parse(&categoria) else {
        warn!("event=notes_add module=ffi status=rejected reason=unknown_category");
        return NoteActionResponse::failure(format!("unknown category `{categoria}`"));
    };
    match note_service().create_note(category, contenido).await {
        Ok(id) => NoteActionResponse::success("Note created.", Some(id)),
        Err(err) => NoteActionResponse::failure(service_error_message("notes_add", &err)),
    }
}

/// Lists every stored note.
pub async fn notes_list() -> NotesListResponse {
    match note_service().list_notes().await {
        Ok(notes) => list_response(notes),
        Err(err) => list_failure("notes_list", &err),
    }
}

/// Replaces category and content of note `id`. Unknown ids succeed as no-op.
pub async fn notes_update(id: i64, categoria: String, contenido: String) -> NoteActionResponse {
    let Some(category) = Category::parse(&categoria) else {
        warn!("event=notes_update module=ffi status=rejected reason=unknown_category");
        return NoteActionResponse::failure(format!("unknown category `{categoria}`"));
    };
    match note_service().update_note(id, category, contenido).await {
        Ok(()) => NoteActionResponse::success("Note updated.", None),
        Err(err) => NoteActionResponse::failure(service_error_message("notes_update", &err)),
    }
}

/// Deletes note `id`. Unknown ids succeed as no-op.
pub async fn notes_delete(id: i64) -> NoteActionResponse {
    match note_service().delete_note(id).await {
        Ok(()) => NoteActionResponse::success("Note deleted.", None),
        Err(err) => {
            warn!("event=notes_delete module=ffi status=error error={}", err);
            NoteActionResponse::failure(format!("notes_delete failed: {err}"))
        }
    }
}

/// Quick filter: notes whose category contains `text` (case-insensitive).
pub async fn notes_filter_by_category(text: String) -> NotesListResponse {
    match note_service().list_notes().await {
        Ok(notes) => list_response(filter_notes_by_category(notes, &text)),
        Err(err) => list_failure("notes_filter_by_category", &err),
    }
}

/// Sends a raw prompt to the AI endpoint.
pub async fn ai_generate_text(prompt: String) -> AiResponse {
    let Some(gateway) = ai_gateway() else {
        return not_configured();
    };
    let outcome = gateway.generate_text(&prompt).await;
    AiResponse::from_outcome(&outcome, AiOperation::GenerateText)
}

/// Summarizes note content.
pub async fn ai_summarize_note(contenido: String) -> AiResponse {
    let Some(gateway) = ai_gateway() else {
        return not_configured();
    };
    let outcome = gateway.summarize_note(&contenido).await;
    AiResponse::from_outcome(&outcome, AiOperation::SummarizeNote)
}

/// Suggests a category label, always one of `note_categories()`.
///
/// `kind` reports the underlying call; `text` is the validated label
/// (default category on mismatch or failure).
pub async fn ai_suggest_category(contenido: String) -> AiResponse {
    let Some(gateway) = ai_gateway() else {
        return not_configured();
    };
    let outcome = gateway.suggest_category(&contenido).await;
    let category = outcome
        .text()
        .and_then(Category::from_model_reply)
        .unwrap_or_default();
    AiResponse {
        kind: outcome.kind().to_string(),
        text: category.as_str().to_string(),
    }
}

/// Natural-language search over all stored notes.
pub async fn ai_search_notes(query: String) -> AiSearchResponse {
    let Some(gateway) = ai_gateway() else {
        let response = not_configured();
        return AiSearchResponse {
            kind: response.kind,
            text: response.text,
            items: Vec::new(),
        };
    };
    let notes = match note_service().list_notes().await {
        Ok(notes) => notes,
        Err(err) => {
            warn!("event=ai_search_notes module=ffi status=error error={}", err);
            return AiSearchResponse {
                kind: "storage_error".to_string(),
                text: format!("ai_search_notes failed: {err}"),
                items: Vec::new(),
            }
        }
    };

    let outcome = gateway.search_notes_natural(&query, &notes).await;
    let items = outcome
        .text()
        .map(|reply| minotas_core::filter_notes_by_reply(reply, &notes))
        .unwrap_or_default()
        .into_iter()
        .map(NoteItem::from)
        .collect();
    AiSearchResponse {
        kind: outcome.kind().to_string(),
        text: outcome.display_text(AiOperation::SearchNotes),
        items,
    }
}

fn build_ai_config(
    api_key: String,
    base_url: Option<String>,
    model: Option<String>,
) -> Result<AiConfig, minotas_core::ConfigError> {
    let mut config = AiConfig::new(api_key)?;
    if let Some(base_url) = base_url.filter(|value| !value.trim().is_empty()) {
        config = config.with_base_url(base_url)?;
    }
    if let Some(model) = model.filter(|value| !value.trim().is_empty()) {
        config = config.with_model(model.trim());
    }
    Ok(config)
}

fn ai_gateway() -> Option<AiGateway> {
    AI_GATEWAY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn install_gateway(gateway: AiGateway) {
    let mut slot = AI_GATEWAY.write().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(gateway);
    info!("event=configure_ai module=ffi status=ok");
}

fn not_configured() -> AiResponse {
    info!("event=ai_call module=ffi status=skipped reason=not_configured");
    AiResponse {
        kind: AI_NOT_CONFIGURED_KIND.to_string(),
        text: "AI is not configured; call configure_ai first.".to_string(),
    }
}

fn storage_config() -> StorageConfig {
    STORAGE_CONFIG.get_or_init(StorageConfig::from_env).clone()
}

fn note_service() -> NoteService {
    NoteService::new(NotesAdapter::new(storage_config()))
}

fn list_response(notes: Vec<Note>) -> NotesListResponse {
    let items: Vec<NoteItem> = notes.into_iter().map(NoteItem::from).collect();
    let message = if items.is_empty() {
        "No notes.".to_string()
    } else {
        format!("Found {} note(s).", items.len())
    };
    NotesListResponse {
        ok: true,
        items,
        message,
    }
}

fn list_failure(operation: &str, err: &minotas_core::RepoError) -> NotesListResponse {
    warn!("event={} module=ffi status=error error={}", operation, err);
    NotesListResponse {
        ok: false,
        items: Vec::new(),
        message: format!("{operation} failed: {err}"),
    }
}

fn service_error_message(operation: &str, err: &NoteServiceError) -> String {
    warn!("event={} module=ffi status=error error={}", operation, err);
    match err {
        NoteServiceError::EmptyContent => "El contenido no puede estar vacío.".to_string(),
        NoteServiceError::Repo(inner) => format!("{operation} failed: {inner}"),
    }
}
