//! Async model client for Hyper-Command execution
//!
//! The executor only sees the [`ModelClient`] trait: one capability that
//! takes a system prompt and the user's block text and returns the model's
//! plain-text answer. [`GeminiClient`] is the concrete adapter for Google's
//! Generative Language REST API.

use crate::core::error::ModelError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// A generative model reachable over some transport
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Submit the ordered payload `[system_prompt, user_text]` and return the response text
    async fn generate(&self, system_prompt: &str, user_text: &str) -> Result<String, ModelError>;
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: Option<u64>,
}

impl GeminiClient {
    /// Create a client for `model`, authorised by `api_key`
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_API_URL.into(),
            model,
            timeout_secs: None,
        }
    }

    /// Point the client at another host (used by tests and proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Abort requests that take longer than `secs`. `None` waits indefinitely.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, system_prompt: &str, user_text: &str) -> Result<String, ModelError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user".into(),
                parts: vec![
                    RequestPart {
                        text: system_prompt.into(),
                    },
                    RequestPart {
                        text: user_text.into(),
                    },
                ],
            }],
        };

        tracing::debug!(model = %self.model, "submitting generateContent request");

        let mut builder = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request);
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(self.timeout_secs.unwrap_or_default())
            } else {
                ModelError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error = classify_error(status, &error_text);
            tracing::warn!(status = status.as_u16(), error = %error, "model request failed");
            return Err(error);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;

        extract_text(body)
    }
}

/// Map a non-success HTTP status and body onto the error taxonomy
fn classify_error(status: StatusCode, body: &str) -> ModelError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => ModelError::RateLimit(message),
        _ => ModelError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(body: GenerateResponse) -> Result<String, ModelError> {
    let content = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| ModelError::MalformedResponse("Empty response".into()))?;

    let texts: Vec<String> = content.parts.into_iter().filter_map(|p| p.text).collect();
    if texts.is_empty() {
        return Err(ModelError::MalformedResponse(
            "Response contained no text".into(),
        ));
    }
    Ok(texts.concat())
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
