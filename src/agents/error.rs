//! Error types for the news agents.
//!
//! Agents never let these escape past their own `execute` boundary; they are
//! converted to text on the stage result instead.

use thiserror::Error;

use crate::error::{LlmError, ResponseError};

/// Errors that can occur during agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Error from the LLM provider.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The model answered with something we could not use.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The spawned task running an agent panicked or was cancelled.
    #[error("Agent task aborted: {0}")]
    Aborted(String),
}

impl AgentError {
    /// Raw model output behind a parse failure, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            AgentError::Response(e) => e.raw_response(),
            _ => None,
        }
    }
}

/// Result type for agent operations.
pub type AgentOutcome<T> = std::result::Result<T, AgentError>;
