//! The oracle seam between the pipeline and the AI backend.
//!
//! Every AI completion in the system goes through [`Oracle`]: drive
//! analysis, dashboard generation, custom queries, and the scheduled
//! maintenance/baseline sweeps. Implementations return parsed JSON and
//! never fail on malformed model output (see [`Oracle::invoke`]).

use async_trait::async_trait;
use serde_json::Value;

/// Scheduling hint forwarded with each oracle call.
///
/// Reserved for rate-limit and queue prioritisation; today every
/// priority maps to the same pro model, so implementations may only
/// log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Background work (per-drive analysis).
    Low,
    /// Interactive work the user is watching (dashboards, queries).
    Medium,
    /// Scheduled sweeps that must not starve (maintenance predictions).
    High,
}

impl Priority {
    /// Wire-style lowercase name, used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// A JSON-in, JSON-out AI completion backend.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Full-strength completion for analysis-grade prompts.
    ///
    /// The response text is parsed as JSON; text that does not parse is
    /// wrapped as `{"raw": text}` instead of failing, so callers can
    /// persist whatever the model said. Errors are reserved for the
    /// transport and API layers.
    async fn invoke(&self, prompt: &str, priority: Priority) -> Result<Value, OracleError>;

    /// Cheaper bounded-output completion used by the weekly baseline
    /// sweep. Same JSON-or-`{"raw"}` contract as [`invoke`](Self::invoke).
    async fn invoke_flash(&self, prompt: &str, max_output_tokens: u32)
        -> Result<Value, OracleError>;
}

/// Errors from the oracle transport layer.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("oracle API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

// --- Tests ---
