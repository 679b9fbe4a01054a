//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for the external generative-language
//! API. It implements the `GenerationService` port from the `core` crate
//! using [`reqwest`].

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use divineverse_core::ports::{GenerationService, PortError, PortResult};

const GENERATE_URL_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Bound on every upstream call; a timeout is handled like any other
/// upstream failure.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationService` against a Gemini-style
/// `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiAdapter {
    /// Creates a new `GeminiAdapter`. The key stays optional so the server
    /// can boot without it; calls fail with a configuration error until it
    /// is set.
    pub fn new(client: reqwest::Client, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// The text of the first part of the first candidate, the only piece of
    /// the reply this application consumes.
    fn first_candidate_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

//=========================================================================================
// `GenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationService for GeminiAdapter {
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            PortError::Configuration("GEMINI_API_KEY is not configured".to_string())
        })?;

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.85,
                "topK": 50,
                "topP": 0.95,
                "maxOutputTokens": 1024
            }
        });

        let url = format!("{}/{}:generateContent", GENERATE_URL_BASE, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PortError::Unexpected(format!("generative language request failed: {e}"))
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PortError::RateLimited);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body_text = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "generative language API returned {status}: {body_text}"
            )));
        }

        let reply: GenerateContentResponse = response.json().await.map_err(|e| {
            PortError::Unexpected(format!("failed to decode generative language reply: {e}"))
        })?;

        reply.first_candidate_text().ok_or_else(|| {
            PortError::Unexpected("generative language reply contained no candidate text".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_candidate_text_is_extracted() {
        let reply: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    { "content": { "parts": [ { "text": "first" }, { "text": "second" } ] } },
                    { "content": { "parts": [ { "text": "other candidate" } ] } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(reply.first_candidate_text().as_deref(), Some("first"));
    }

    #[test]
    fn missing_pieces_yield_none() {
        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.first_candidate_text(), None);

        let no_parts: GenerateContentResponse =
            serde_json::from_str(r#"{ "candidates": [ { "content": { "parts": [] } } ] }"#)
                .unwrap();
        assert_eq!(no_parts.first_candidate_text(), None);

        let no_text: GenerateContentResponse =
            serde_json::from_str(r#"{ "candidates": [ { "content": { "parts": [ {} ] } } ] }"#)
                .unwrap();
        assert_eq!(no_text.first_candidate_text(), None);
    }
}
