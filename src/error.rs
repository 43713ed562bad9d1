//! Error types for news-forge operations.
//!
//! Defines error types for the subsystems shared across the pipeline:
//! - Remote model calls
//! - Parsing loosely-structured model output
//! - Article validation
//! - The persisted design memory

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP client could not be constructed: {0}")]
    ClientBuild(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("LLM response contained no text content (stop_reason: {stop_reason})")]
    EmptyResponse { stop_reason: String },
}

/// Errors produced while turning model output into typed records.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The cleaned-up text could not be decoded as a JSON object.
    ///
    /// Carries the untouched response so the failure can be diagnosed.
    #[error("Malformed response: {source}{hint}")]
    Malformed {
        raw: String,
        hint: String,
        #[source]
        source: serde_json::Error,
    },

    /// A selection decoded cleanly but none of its entries were usable identifiers.
    #[error("No valid selection: none of the {entries} selected entries is a valid identifier")]
    NoValidSelection { entries: usize },
}

impl ResponseError {
    /// The raw response text, when the error carries it.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ResponseError::Malformed { raw, .. } => Some(raw),
            ResponseError::NoValidSelection { .. } => None,
        }
    }
}

/// Errors raised when constructing an [`crate::models::Article`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArticleError {
    #[error("Article must have a non-empty title")]
    MissingTitle,

    #[error("Article must have a non-empty summary")]
    MissingSummary,

    #[error("Invalid source URL '{url}': {reason}")]
    InvalidSourceUrl { url: String, reason: String },

    #[error("Invalid credibility tier {0}: must be 1, 2 or 3")]
    InvalidCredibilityTier(i64),
}

/// Errors that can occur while persisting the design memory.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("IO error on design memory '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
