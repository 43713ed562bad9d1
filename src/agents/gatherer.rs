//! Gatherer agent: searches the web for one beat and returns typed articles.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::llm::LlmProvider;
use crate::models::{AgentResult, Article};
use crate::pipeline::diagnostics::DiagnosticSink;
use crate::prompts::{build_gatherer_prompt, GathererSpec};

use super::common::{call_model, render_today, AgentConfig};
use super::error::AgentOutcome;
use super::parser::parse_articles;
use super::Agent;

/// Runs one gathering call for a [`GathererSpec`].
///
/// `execute` never fails: every error ends up on the returned
/// [`AgentResult`], so one bad gatherer cannot take down the fan-out.
pub struct GathererAgent {
    llm: Arc<dyn LlmProvider>,
    spec: GathererSpec,
    config: AgentConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl GathererAgent {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        spec: GathererSpec,
        config: AgentConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            llm,
            spec,
            config,
            sink,
        }
    }

    async fn gather(&self) -> AgentOutcome<(Vec<Article>, u32)> {
        let prompt = build_gatherer_prompt(&self.spec, &render_today());
        let response = call_model(
            self.llm.as_ref(),
            &self.config.model,
            prompt,
            self.config.max_tokens,
            Some(self.spec.max_searches),
        )
        .await?;

        let searches = response.search_count();
        let articles = parse_articles(
            &response.text(),
            &self.spec.name,
            self.spec.default_category,
        )?;
        Ok((articles, searches))
    }
}

#[async_trait]
impl Agent for GathererAgent {
    type Input = ();
    type Output = AgentResult;

    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn execute(&self, _input: ()) -> AgentResult {
        let started = Instant::now();
        let result = AgentResult::pending(self.name());

        tracing::info!(
            agent = %self.spec.name,
            beat = %self.spec.beat,
            max_searches = self.spec.max_searches,
            "Starting gatherer"
        );

        match self.gather().await {
            Ok((articles, searches)) => {
                let elapsed = started.elapsed();
                self.sink.info(
                    self.name(),
                    &format!(
                        "{} articles ({} searches, {:.1}s)",
                        articles.len(),
                        searches,
                        elapsed.as_secs_f64()
                    ),
                );
                result.succeeded(articles, searches, elapsed)
            }
            Err(e) => {
                if let Some(raw) = e.raw_response() {
                    tracing::debug!(agent = %self.spec.name, raw, "Unparseable gatherer response");
                }
                self.sink.error(self.name(), &format!("FAILED: {}", e));
                result.failed(e.to_string(), started.elapsed())
            }
        }
    }
}
