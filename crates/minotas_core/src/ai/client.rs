//! HTTP client for the `generateContent` endpoint.
//!
//! # Responsibility
//! - Build the single conversational request body used by every operation.
//! - Classify the HTTP exchange into an `AiOutcome`.
//!
//! # Invariants
//! - The API key travels only as the `key` query parameter; it is never
//!   logged (URLs are stripped from transport errors before logging).
//! - Every request is bounded by the configured timeout.

use super::outcome::AiOutcome;
use crate::config::{AiConfig, ConfigError};
use log::{debug, error, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Request body: `{"contents":[{"role":"user","parts":[{"text":..}]}], ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Wraps one user prompt.
    pub fn user_prompt(prompt: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.into()),
                }],
            }],
            generation_config: GenerationConfig { max_output_tokens },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Subset of the response body the gateway reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Returns `candidates[0].content.parts[0].text`.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Thin client bound to one endpoint configuration.
#[derive(Debug, Clone)]
pub struct GenerativeClient {
    http: reqwest::Client,
    config: AiConfig,
}

impl GenerativeClient {
    /// # Errors
    /// Returns `ConfigError::HttpClient` when the TLS backend or the
    /// timeout-bound client cannot be initialized.
    pub fn new(config: AiConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| {
                error!("event=ai_client_build module=ai status=error error={}", err);
                ConfigError::HttpClient(err.to_string())
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Sends one prompt and classifies the exchange.
    pub async fn generate(&self, operation: &'static str, prompt: String) -> AiOutcome {
        let started_at = Instant::now();
        let body = GenerateContentRequest::user_prompt(prompt, self.config.max_output_tokens);
        let outcome = self.exchange(&body).await;
        let elapsed_ms = started_at.elapsed().as_millis();

        match &outcome {
            AiOutcome::Ok(_) | AiOutcome::Empty | AiOutcome::NoNotes => debug!(
                "event=ai_request module=ai status=ok operation={} outcome={} duration_ms={}",
                operation,
                outcome.kind(),
                elapsed_ms
            ),
            AiOutcome::RateLimited => warn!(
                "event=ai_request module=ai status=rate_limited operation={} duration_ms={}",
                operation, elapsed_ms
            ),
            AiOutcome::TransportError(detail) | AiOutcome::MalformedResponse(detail) => error!(
                "event=ai_request module=ai status=error operation={} outcome={} duration_ms={} error={}",
                operation,
                outcome.kind(),
                elapsed_ms,
                detail
            ),
        }
        outcome
    }

    async fn exchange(&self, body: &GenerateContentRequest) -> AiOutcome {
        let response = match self
            .http
            .post(self.config.generate_content_url())
            .query(&[("key", self.config.api_key())])
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return AiOutcome::TransportError(err.without_url().to_string()),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return AiOutcome::RateLimited;
        }

        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(err) => return AiOutcome::TransportError(err.without_url().to_string()),
        };
        if !status.is_success() {
            return AiOutcome::TransportError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(&raw, MAX_ERROR_BODY_CHARS)
            ));
        }

        classify_body(&raw)
    }
}

/// Classifies a successful response body.
pub fn classify_body(raw: &str) -> AiOutcome {
    let parsed: GenerateContentResponse = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(err) => return AiOutcome::MalformedResponse(format!("invalid JSON: {err}")),
    };
    match parsed.first_text() {
        Some(text) if text.trim().is_empty() => AiOutcome::Empty,
        Some(text) => AiOutcome::Ok(text.trim().to_string()),
        None => AiOutcome::MalformedResponse(
            "missing candidates[0].content.parts[0].text".to_string(),
        ),
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut out: String = flattened.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
