//! Helpers shared by every agent.

use chrono::{Local, NaiveDate};

use crate::error::LlmError;
use crate::llm::{GenerationRequest, GenerationResponse, LlmProvider, Message};

use super::error::AgentOutcome;

/// Default model for gathering and page building.
pub const DEFAULT_WORKER_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Default model for curation.
pub const DEFAULT_CURATOR_MODEL: &str = "claude-opus-4-5-20251101";

/// Model and output budget for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub model: String,
    pub max_tokens: u32,
}

impl AgentConfig {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
        }
    }

    /// Gatherer defaults.
    pub fn gatherer() -> Self {
        Self::new(DEFAULT_WORKER_MODEL, 8000)
    }

    /// Curator defaults.
    pub fn curator() -> Self {
        Self::new(DEFAULT_CURATOR_MODEL, 4000)
    }

    /// Builder defaults; pages are long.
    pub fn builder() -> Self {
        Self::new(DEFAULT_WORKER_MODEL, 16000)
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Long-form date used in prompts, e.g. "October 19, 2026".
pub fn render_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Today's date in long form.
pub fn render_today() -> String {
    render_date(Local::now().date_naive())
}

/// Sends a single-turn prompt and returns the response.
///
/// A response without any text block is reported as
/// [`LlmError::EmptyResponse`] so callers only ever see usable output.
pub async fn call_model(
    provider: &dyn LlmProvider,
    model: &str,
    prompt: String,
    max_tokens: u32,
    max_searches: Option<u32>,
) -> AgentOutcome<GenerationResponse> {
    let mut request =
        GenerationRequest::new(model, vec![Message::user(prompt)]).with_max_tokens(max_tokens);
    if let Some(max_uses) = max_searches {
        request = request.with_web_search(max_uses);
    }

    tracing::debug!(
        model,
        max_tokens,
        prompt_chars = request.prompt_text().len(),
        "Calling model"
    );

    let response = provider.generate(request).await?;

    tracing::debug!(
        model,
        stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
        searches = response.search_count(),
        "Response received"
    );

    if !response.has_text() {
        return Err(LlmError::EmptyResponse {
            stop_reason: response
                .stop_reason
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        }
        .into());
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        assert_eq!(render_date(date), "October 19, 2026");

        let date = NaiveDate::from_ymd_opt(2026, 3, 4).expect("valid date");
        assert_eq!(render_date(date), "March 04, 2026");
    }
}
