//! Gemini-backed text model for the advisor.
//!
//! # Responsibility
//! - Issue `generateContent` requests and extract the first candidate text.
//! - Constrain subtask requests to a JSON array of strings via the request
//!   generation config.

use crate::advisor::{AdvisorError, ResponseShape, TextModel};
use async_trait::async_trait;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MODEL: &str = "gemini-2.0-flash";

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiModel {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Overridable endpoint, used to point tests at a stub server.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    fn request_body(prompt: &str, shape: ResponseShape) -> serde_json::Value {
        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        if shape == ResponseShape::JsonStringArray {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } }
            });
        }
        body
    }

    fn extract_text(payload: &serde_json::Value) -> Result<String, AdvisorError> {
        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AdvisorError::MalformedResponse("no candidate text in response".to_string())
            })
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    async fn generate(&self, prompt: &str, shape: ResponseShape) -> Result<String, AdvisorError> {
        let url = format!(
            "{}/v1beta/models/{MODEL}:generateContent?key={}",
            self.base_url, self.api_key
        );

        let response = self
            .http
            .post(url)
            .json(&Self::request_body(prompt, shape))
            .send()
            .await
            .map_err(|err| AdvisorError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Transport(format!("http {status}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|err| AdvisorError::MalformedResponse(err.to_string()))?;

        Self::extract_text(&payload)
    }
}
