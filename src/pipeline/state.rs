//! Aggregate state of one pipeline run.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AgentResult, Article, BuildResult, CurationResult};

/// Everything a run has produced so far.
///
/// Only the orchestrator mutates the state, once per stage. Derived views
/// are computed on demand from the stage results.
#[derive(Debug, Clone)]
pub struct PipelineState {
    agent_results: Vec<AgentResult>,
    curation: Option<CurationResult>,
    build: Option<BuildResult>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            agent_results: Vec::new(),
            curation: None,
            build: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Stores the stage 1 results, in gatherer launch order.
    pub fn record_gathering(&mut self, results: Vec<AgentResult>) {
        self.agent_results = results;
    }

    pub fn record_curation(&mut self, result: CurationResult) {
        self.curation = Some(result);
    }

    pub fn record_build(&mut self, result: BuildResult) {
        self.build = Some(result);
    }

    /// Stamps the end of the run.
    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn agent_results(&self) -> &[AgentResult] {
        &self.agent_results
    }

    pub fn curation(&self) -> Option<&CurationResult> {
        self.curation.as_ref()
    }

    pub fn build(&self) -> Option<&BuildResult> {
        self.build.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// All gathered articles, concatenated in gatherer order.
    pub fn all_articles(&self) -> Vec<&Article> {
        self.agent_results
            .iter()
            .flat_map(|result| result.articles.iter())
            .collect()
    }

    /// Curated articles in selection (display) order.
    ///
    /// Identifiers that match no gathered article are skipped. Empty until
    /// curation has run.
    pub fn selected_articles(&self) -> Vec<&Article> {
        let Some(curation) = &self.curation else {
            return Vec::new();
        };

        let by_id: HashMap<Uuid, &Article> = self
            .all_articles()
            .into_iter()
            .map(|article| (article.id, article))
            .collect();

        curation
            .selected_ids
            .iter()
            .filter_map(|id| by_id.get(id).copied())
            .collect()
    }

    pub fn total_articles(&self) -> usize {
        self.agent_results.iter().map(AgentResult::len).sum()
    }

    pub fn successful_agents(&self) -> usize {
        self.agent_results.iter().filter(|r| r.success).count()
    }

    pub fn failed_agents(&self) -> usize {
        self.agent_results.iter().filter(|r| !r.success).count()
    }

    /// Total web searches reported across gatherers.
    pub fn total_searches(&self) -> u32 {
        self.agent_results.iter().map(|r| r.search_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn articles(prefix: &str, n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| {
                Article::new(
                    format!("{prefix} {i}"),
                    "summary",
                    format!("https://example.com/{prefix}/{i}"),
                )
                .expect("valid")
            })
            .collect()
    }

    fn state_with_results() -> PipelineState {
        let mut state = PipelineState::new();
        state.record_gathering(vec![
            AgentResult::pending("a").succeeded(articles("a", 3), 1, Duration::ZERO),
            AgentResult::pending("b").failed("boom", Duration::ZERO),
            AgentResult::pending("c").succeeded(articles("c", 2), 3, Duration::ZERO),
        ]);
        state
    }

    #[test]
    fn test_counts() {
        let state = state_with_results();
        assert_eq!(state.total_articles(), 5);
        assert_eq!(state.all_articles().len(), 5);
        assert_eq!(state.successful_agents(), 2);
        assert_eq!(state.failed_agents(), 1);
        assert_eq!(state.total_searches(), 4);
        assert_eq!(state.all_articles()[3].title, "c 0");
    }

    #[test]
    fn test_selected_articles_empty_before_curation() {
        let state = state_with_results();
        assert!(state.selected_articles().is_empty());
    }

    #[test]
    fn test_selected_articles_in_selection_order() {
        let mut state = state_with_results();
        let all: Vec<Uuid> = state.all_articles().iter().map(|a| a.id).collect();
        let unknown = Uuid::new_v4();

        state.record_curation(CurationResult::completed(
            vec![all[4], unknown, all[0], all[2]],
            "why",
            Duration::ZERO,
        ));

        let titles: Vec<&str> = state
            .selected_articles()
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, vec!["c 1", "a 0", "a 2"]);
    }

    #[test]
    fn test_finish_stamps_completion() {
        let mut state = PipelineState::new();
        assert!(state.completed_at().is_none());
        state.finish();
        assert!(state.completed_at().is_some_and(|t| t >= state.started_at()));
    }
}
