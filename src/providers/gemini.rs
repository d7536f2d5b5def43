//! Gemini REST client for single-turn text generation.
//!
//! Calls `POST {base}/models/{model}:generateContent` with the API key in the
//! `x-goog-api-key` header.
//! See: <https://ai.google.dev/api/generate-content>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::traits::TextGenerator;
use crate::{CasebookError, Result};

/// Default base URL for the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used for all artifacts.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    /// Create a client for the public Gemini API.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CasebookError::Http(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Generate a completion for a single user turn.
    ///
    /// # Arguments
    /// * `model` - Gemini model ID (e.g., `gemini-3-flash-preview`)
    /// * `prompt` - Full instruction text
    pub async fn generate_content(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::user(prompt))
            .send()
            .await
            .map_err(|e| CasebookError::Http(e.to_string()))?;

        let response = Self::check_status(response, model).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| CasebookError::Http(e.to_string()))?;

        extract_text(&body)
            .filter(|text| !text.trim().is_empty())
            .ok_or(CasebookError::EmptyResponse)
    }

    /// Map non-success HTTP statuses to errors.
    async fn check_status(response: reqwest::Response, model: &str) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            401 | 403 => Err(CasebookError::AuthenticationFailed),
            404 => Err(CasebookError::ModelNotFound(model.to_string())),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(CasebookError::RateLimited { retry_after })
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| v["error"]["message"].as_str().map(String::from))
                    .unwrap_or_else(|| format!("Gemini API error: {status}"));
                Err(CasebookError::Api {
                    status: code,
                    message,
                })
            }
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.generate_content(model, prompt).await
    }
}

/// Join the text parts of the first candidate.
///
/// Thinking models tag reasoning parts with `"thought": true`; those are
/// skipped unless nothing else is present.
fn extract_text(response: &Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;

    let answer: Vec<&str> = parts
        .iter()
        .filter(|p| !p["thought"].as_bool().unwrap_or(false))
        .filter_map(|p| p["text"].as_str())
        .collect();
    if !answer.is_empty() {
        return Some(answer.concat());
    }

    let thoughts: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    (!thoughts.is_empty()).then(|| thoughts.concat())
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

impl<'a> GenerateContentRequest<'a> {
    fn user(text: &'a str) -> Self {
        Self {
            contents: [Content {
                role: "user",
                parts: [Part { text }],
            }],
        }
    }
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_text_joins_answer_parts() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "{\"a\":"},
                    {"text": "1}"}
                ]}
            }]
        });
        assert_eq!(extract_text(&body).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn extract_text_falls_back_to_thoughts() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "only thought", "thought": true}]}}]
        });
        assert_eq!(extract_text(&body).as_deref(), Some("only thought"));
    }

    #[test]
    fn extract_text_missing_candidates() {
        assert!(extract_text(&json!({"candidates": []})).is_none());
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::user("hi")).unwrap();
        assert_eq!(
            body,
            json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn debug_redacts_key() {
        let client = GeminiClient::new("secret-key").unwrap();
        assert!(!format!("{client:?}").contains("secret-key"));
    }
}
