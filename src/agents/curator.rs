//! Curator agent: picks and orders the day's articles.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Timelike;

use crate::llm::LlmProvider;
use crate::models::{Article, CurationResult};
use crate::pipeline::diagnostics::DiagnosticSink;
use crate::prompts::build_curator_prompt;

use super::common::{call_model, render_today, AgentConfig};
use super::error::AgentOutcome;
use super::parser::{parse_selection, Selection};
use super::Agent;

/// Agent name used in diagnostics.
pub const CURATOR_NAME: &str = "Curator";

/// Curator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratorConfig {
    pub agent: AgentConfig,
    /// Lower end of the selection size requested in the prompt.
    pub target_low: usize,
    /// Hard upper bound; longer selections are truncated in order.
    pub max_selected: usize,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::curator(),
            target_low: 8,
            max_selected: 12,
        }
    }
}

impl CuratorConfig {
    /// Set the requested selection range.
    pub fn with_target(mut self, target_low: usize, max_selected: usize) -> Self {
        self.max_selected = max_selected.max(1);
        self.target_low = target_low.clamp(1, self.max_selected);
        self
    }
}

/// Sends the compact article index to the model and parses its selection.
pub struct CuratorAgent {
    llm: Arc<dyn LlmProvider>,
    config: CuratorConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl CuratorAgent {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        config: CuratorConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self { llm, config, sink }
    }

    async fn curate(&self, articles: &[Article]) -> AgentOutcome<Selection> {
        let agent_count = articles
            .iter()
            .map(|a| a.gathered_by.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        let prompt = build_curator_prompt(
            &render_today(),
            articles.len(),
            agent_count,
            &build_article_index(articles),
            (self.config.target_low, self.config.max_selected),
        );

        let response = call_model(
            self.llm.as_ref(),
            &self.config.agent.model,
            prompt,
            self.config.agent.max_tokens,
            None,
        )
        .await?;

        let mut selection = parse_selection(&response.text())?;
        if selection.ids.len() > self.config.max_selected {
            self.sink.warn(
                CURATOR_NAME,
                &format!(
                    "Curator selected {} articles, keeping the first {}",
                    selection.ids.len(),
                    self.config.max_selected
                ),
            );
            selection.ids.truncate(self.config.max_selected);
        }
        Ok(selection)
    }
}

/// Compact per-article index shown to the curator.
pub fn build_article_index(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|article| {
            let published = article
                .published
                .map(|p| {
                    if p.time().num_seconds_from_midnight() == 0 {
                        p.format("%Y-%m-%d").to_string()
                    } else {
                        p.format("%Y-%m-%d %H:%M").to_string()
                    }
                })
                .unwrap_or_else(|| "Unknown".to_string());

            format!(
                "ID: {}\nTitle: {}\nSummary: {}\nCategory: {}\nCredibility: {}\nPublished: {}\n---",
                article.id,
                article.title,
                article.summary,
                article.category,
                article.credibility,
                published
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Agent for CuratorAgent {
    type Input = Vec<Article>;
    type Output = CurationResult;

    fn name(&self) -> &str {
        CURATOR_NAME
    }

    async fn execute(&self, articles: Vec<Article>) -> CurationResult {
        let started = Instant::now();

        if articles.is_empty() {
            self.sink.error(self.name(), "No articles to curate");
            return CurationResult::failed("No articles to curate", started.elapsed());
        }

        self.sink.info(
            self.name(),
            &format!("Curating from {} articles", articles.len()),
        );

        match self.curate(&articles).await {
            Ok(selection) => {
                tracing::debug!(selected = selection.ids.len(), reasoning = %selection.reasoning, "Selection parsed");
                CurationResult::completed(selection.ids, selection.reasoning, started.elapsed())
            }
            Err(e) => {
                if let Some(raw) = e.raw_response() {
                    tracing::debug!(raw, "Unparseable curator response");
                }
                self.sink.error(self.name(), &format!("FAILED: {}", e));
                CurationResult::failed(e.to_string(), started.elapsed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{GenerationRequest, GenerationResponse};
    use crate::models::{CredibilityTier, NewsCategory};
    use crate::pipeline::diagnostics::{Level, RecordingSink};
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct MockLlmProvider {
        response: Mutex<String>,
        prompts: Mutex<Vec<GenerationRequest>>,
    }

    impl MockLlmProvider {
        fn new(response: impl Into<String>) -> Self {
            Self {
                response: Mutex::new(response.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
            self.prompts.lock().expect("lock not poisoned").push(request);
            let content = self.response.lock().expect("lock not poisoned").clone();
            Ok(GenerationResponse::from_text("mock-model", content))
        }
    }

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| {
                Article::new(
                    format!("Story {i}"),
                    format!("Summary {i}"),
                    format!("https://example.com/{i}"),
                )
                .expect("valid")
                .with_gathered_by(if i % 2 == 0 { "A" } else { "B" })
            })
            .collect()
    }

    fn selection_json(ids: &[Uuid]) -> String {
        let ids: Vec<String> = ids.iter().map(|id| format!("\"{id}\"")).collect();
        format!(
            r#"{{"selected_uuids": [{}], "reasoning": "A balanced mix."}}"#,
            ids.join(", ")
        )
    }

    #[test]
    fn test_build_article_index() {
        let article = Article::new("Title", "Summary", "https://example.com")
            .expect("valid")
            .with_category(NewsCategory::Climate)
            .with_credibility(CredibilityTier::Primary)
            .with_published(
                NaiveDate::from_ymd_opt(2026, 10, 18).and_then(|d| d.and_hms_opt(0, 0, 0)),
            );
        let undated = Article::new("Other", "More", "https://example.com/x").expect("valid");

        let index = build_article_index(&[article.clone(), undated]);
        assert!(index.contains(&format!("ID: {}", article.id)));
        assert!(index.contains("Category: climate_environment"));
        assert!(index.contains("Credibility: Tier 1"));
        assert!(index.contains("Published: 2026-10-18\n"));
        assert!(index.contains("Published: Unknown"));
        assert!(!index.contains("source"));
        assert_eq!(index.matches("---").count(), 2);
    }

    #[tokio::test]
    async fn test_curator_selects_in_order() {
        let pool = articles(6);
        let picked = vec![pool[4].id, pool[1].id, pool[3].id];
        let provider = Arc::new(MockLlmProvider::new(selection_json(&picked)));
        let sink = Arc::new(RecordingSink::new());

        let curator = CuratorAgent::new(provider.clone(), CuratorConfig::default(), sink);
        let result = curator.execute(pool).await;

        assert!(result.success);
        assert_eq!(result.selected_ids, picked);
        assert_eq!(result.reasoning, "A balanced mix.");

        let requests = provider.prompts.lock().expect("lock not poisoned");
        assert_eq!(requests[0].model, "claude-opus-4-5-20251101");
        assert_eq!(requests[0].max_tokens, 4000);
        assert!(requests[0].web_search.is_none());
        assert!(requests[0]
            .prompt_text()
            .contains("You have 6 articles from 2 specialized agents"));
    }

    #[tokio::test]
    async fn test_curator_truncates_long_selection() {
        let pool = articles(15);
        let all: Vec<Uuid> = pool.iter().map(|a| a.id).collect();
        let provider = Arc::new(MockLlmProvider::new(selection_json(&all)));
        let sink = Arc::new(RecordingSink::new());

        let config = CuratorConfig::default().with_target(8, 12);
        let result = CuratorAgent::new(provider, config, sink.clone())
            .execute(pool)
            .await;

        assert!(result.success);
        assert_eq!(result.selected_ids, all[..12].to_vec());
        assert_eq!(sink.messages(Level::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_curator_partial_invalid_selection() {
        let pool = articles(3);
        let raw = format!(
            r#"{{"selected_uuids": ["nope", "{}", "1234"], "reasoning": "Only one."}}"#,
            pool[2].id
        );
        let provider = Arc::new(MockLlmProvider::new(raw));
        let result = CuratorAgent::new(
            provider,
            CuratorConfig::default(),
            Arc::new(RecordingSink::new()),
        )
        .execute(pool.clone())
        .await;

        assert!(result.success);
        assert_eq!(result.selected_ids, vec![pool[2].id]);
    }

    #[tokio::test]
    async fn test_curator_failure_is_reported() {
        let provider = Arc::new(MockLlmProvider::new(
            r#"{"selected_uuids": ["a", "b"], "reasoning": ""}"#,
        ));
        let sink = Arc::new(RecordingSink::new());
        let result = CuratorAgent::new(provider, CuratorConfig::default(), sink.clone())
            .execute(articles(4))
            .await;

        assert!(!result.success);
        assert!(result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("No valid selection")));
        assert_eq!(sink.messages(Level::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_curator_empty_input_skips_call() {
        let provider = Arc::new(MockLlmProvider::new("{}"));
        let result = CuratorAgent::new(
            provider.clone(),
            CuratorConfig::default(),
            Arc::new(RecordingSink::new()),
        )
        .execute(Vec::new())
        .await;

        assert!(!result.success);
        assert!(provider.prompts.lock().expect("lock not poisoned").is_empty());
    }
}
