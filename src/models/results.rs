//! Per-stage results recorded on the pipeline state.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::article::Article;

/// Outcome of a single gatherer invocation.
///
/// Created with [`AgentResult::pending`] when the invocation starts and
/// finalised exactly once through [`AgentResult::succeeded`] or
/// [`AgentResult::failed`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// Name of the gatherer.
    pub agent_name: String,
    /// Articles produced; empty on failure.
    pub articles: Vec<Article>,
    /// Wall time spent in the invocation.
    pub elapsed: Duration,
    /// Web searches the service reported for the call.
    pub search_count: u32,
    /// Whether the invocation completed.
    pub success: bool,
    /// Error text when the invocation failed.
    pub error: Option<String>,
}

impl AgentResult {
    /// Creates a pending result for an invocation that has just started.
    pub fn pending(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            articles: Vec::new(),
            elapsed: Duration::ZERO,
            search_count: 0,
            success: false,
            error: None,
        }
    }

    /// Marks the invocation as completed with its articles.
    pub fn succeeded(mut self, articles: Vec<Article>, search_count: u32, elapsed: Duration) -> Self {
        self.articles = articles;
        self.search_count = search_count;
        self.elapsed = elapsed;
        self.success = true;
        self.error = None;
        self
    }

    /// Marks the invocation as failed.
    pub fn failed(mut self, error: impl Into<String>, elapsed: Duration) -> Self {
        self.articles.clear();
        self.elapsed = elapsed;
        self.success = false;
        self.error = Some(error.into());
        self
    }

    /// Number of articles produced.
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// Whether no articles were produced.
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Outcome of the curation stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurationResult {
    /// Selected article identifiers in display order.
    pub selected_ids: Vec<Uuid>,
    /// The curator's editorial rationale.
    pub reasoning: String,
    pub elapsed: Duration,
    pub success: bool,
    pub error: Option<String>,
}

impl CurationResult {
    /// A completed curation.
    pub fn completed(selected_ids: Vec<Uuid>, reasoning: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            selected_ids,
            reasoning: reasoning.into(),
            elapsed,
            success: true,
            error: None,
        }
    }

    /// A failed curation.
    pub fn failed(error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            elapsed,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Outcome of the build stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildResult {
    /// The rendered document.
    pub html: String,
    /// Whether the document-start marker was present in the response.
    pub marker_found: bool,
    pub elapsed: Duration,
    pub success: bool,
    pub error: Option<String>,
}

impl BuildResult {
    /// A completed build.
    pub fn completed(html: impl Into<String>, marker_found: bool, elapsed: Duration) -> Self {
        Self {
            html: html.into(),
            marker_found,
            elapsed,
            success: true,
            error: None,
        }
    }

    /// A failed build.
    pub fn failed(error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            elapsed,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_result_lifecycle() {
        let article = Article::new("t", "s", "https://example.com").expect("valid");
        let result = AgentResult::pending("Gatherer-a");
        assert!(!result.success);
        assert!(result.error.is_none());

        let result = result.succeeded(vec![article], 2, Duration::from_millis(40));
        assert!(result.success);
        assert_eq!(result.len(), 1);
        assert_eq!(result.search_count, 2);
    }

    #[test]
    fn test_agent_result_failed_drops_articles() {
        let article = Article::new("t", "s", "https://example.com").expect("valid");
        let result = AgentResult::pending("Gatherer-b")
            .succeeded(vec![article], 1, Duration::ZERO)
            .failed("timeout", Duration::from_secs(1));

        assert!(!result.success);
        assert!(result.is_empty());
        assert_eq!(result.error.as_deref(), Some("timeout"));
        assert_eq!(result.elapsed, Duration::from_secs(1));
    }

    #[test]
    fn test_curation_and_build_failed() {
        let curation = CurationResult::failed("bad json", Duration::from_secs(2));
        assert!(!curation.success);
        assert!(curation.selected_ids.is_empty());

        let build = BuildResult::failed("api error", Duration::ZERO);
        assert!(!build.success);
        assert!(build.html.is_empty());
        assert!(!build.marker_found);
    }
}
