//! Gemini-backed AI oracle.
//!
//! [`Oracle`] is the seam the analysis pipeline calls for every AI
//! completion; [`GeminiClient`] implements it against the Gemini
//! `generateContent` REST API. Pipeline code and its tests depend only
//! on the trait, so the HTTP client can be swapped for a canned oracle.

pub mod client;
pub mod oracle;

pub use client::GeminiClient;
pub use oracle::{Oracle, OracleError, Priority};
