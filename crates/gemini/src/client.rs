//! REST client for the Gemini `generateContent` endpoint.
//!
//! [`GeminiClient`] implements the [`Oracle`] seam over the Gemini HTTP
//! API. Two models are configured: a pro model for analysis-grade
//! prompts and a cheaper flash model for the bounded-output sweeps.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::oracle::{Oracle, OracleError, Priority};

/// HTTP client for the Gemini REST API.
///
/// Holds the base URL, API key, and the two model names. One instance
/// is shared by every pipeline component; `reqwest::Client` pools
/// connections internally.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    pro_model: String,
    flash_model: String,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// * `base_url`    - API origin, e.g. `https://generativelanguage.googleapis.com`.
    /// * `api_key`     - sent as the `x-goog-api-key` header on every request.
    /// * `pro_model`   - model for [`Oracle::invoke`], e.g. `gemini-2.5-pro`.
    /// * `flash_model` - model for [`Oracle::invoke_flash`], e.g. `gemini-2.5-flash`.
    pub fn new(base_url: String, api_key: String, pro_model: String, flash_model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            pro_model,
            flash_model,
        }
    }

    /// Model name used for full-strength completions.
    pub fn pro_model(&self) -> &str {
        &self.pro_model
    }

    /// Model name used for bounded-output completions.
    pub fn flash_model(&self) -> &str {
        &self.flash_model
    }

    /// POST a `generateContent` request and parse the candidate text.
    ///
    /// Non-2xx responses become [`OracleError::Api`] with the raw body.
    /// A 2xx response is always a success: its text is parsed as JSON,
    /// falling back to `{"raw": text}` when the model ignored the JSON
    /// mime type.
    async fn generate(&self, model: &str, body: &Value) -> Result<Value, OracleError> {
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(OracleError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateResponse = response.json().await?;
        Ok(parse_json_or_raw(payload.text()))
    }
}

#[async_trait]
impl Oracle for GeminiClient {
    async fn invoke(&self, prompt: &str, priority: Priority) -> Result<Value, OracleError> {
        tracing::info!(
            model = %self.pro_model,
            priority = priority.as_str(),
            prompt_chars = prompt.len(),
            "Invoking oracle"
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.3,
                "responseMimeType": "application/json",
            },
        });

        self.generate(&self.pro_model, &body).await
    }

    async fn invoke_flash(
        &self,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<Value, OracleError> {
        tracing::info!(
            model = %self.flash_model,
            max_output_tokens,
            prompt_chars = prompt.len(),
            "Invoking flash oracle"
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.2,
                "responseMimeType": "application/json",
                "maxOutputTokens": max_output_tokens,
            },
        });

        self.generate(&self.flash_model, &body).await
    }
}

// ---- response parsing ----

/// Response body of `generateContent`, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
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

impl GenerateResponse {
    /// Text of the first candidate part, or `""` when the response has
    /// no candidates (safety blocks, empty completions).
    fn text(&self) -> &str {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
            .unwrap_or("")
    }
}

/// Parse the model's text as JSON, wrapping non-JSON output as
/// `{"raw": text}` so callers always receive a value they can persist.
fn parse_json_or_raw(text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            let preview: String = text.chars().take(200).collect();
            tracing::warn!(%preview, "Oracle response was not valid JSON, wrapping as raw text");
            serde_json::json!({ "raw": text })
        }
    }
}

// --- Tests ---
