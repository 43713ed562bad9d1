//! Builder agent: renders the curated articles into a self-contained page.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::llm::LlmProvider;
use crate::models::{Article, BuildResult};
use crate::pipeline::diagnostics::DiagnosticSink;
use crate::prompts::{build_builder_prompt, BuilderPromptInput};

use super::common::{call_model, render_today, AgentConfig};
use super::Agent;

/// Agent name used in diagnostics.
pub const BUILDER_NAME: &str = "Builder";

/// Literal token that starts the generated document.
pub const DOCUMENT_START_MARKER: &str = "<!DOCTYPE html>";

/// Prompt context that varies from day to day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderContext {
    /// Rendered `<recent_designs>` block.
    pub recent_designs: String,
    /// Rendered `<creative_nudge>` block, empty for no directive.
    pub creative_nudge: String,
}

/// Turns the selected articles into an HTML page.
pub struct BuilderAgent {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
    design_instructions: String,
    context: BuilderContext,
    sink: Arc<dyn DiagnosticSink>,
}

impl BuilderAgent {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        config: AgentConfig,
        design_instructions: impl Into<String>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            llm,
            config,
            design_instructions: design_instructions.into(),
            context: BuilderContext::default(),
            sink,
        }
    }

    /// Set the day's context blocks.
    pub fn with_context(mut self, context: BuilderContext) -> Self {
        self.context = context;
        self
    }
}

/// Escapes text for inclusion in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Formats the selected articles in display order.
pub fn format_articles(articles: &[Article]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            format!(
                "Article {}:\nTitle: {}\nSummary: {}\nSource: {}\nCategory: {}\n---",
                i + 1,
                escape_html(&article.title),
                escape_html(&article.summary),
                escape_html(&article.source_url),
                article.category
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the document from the start marker onward and whether the marker was found.
pub fn extract_document(text: &str) -> (&str, bool) {
    match text.find(DOCUMENT_START_MARKER) {
        Some(start) => (&text[start..], true),
        None => (text, false),
    }
}

#[async_trait]
impl Agent for BuilderAgent {
    type Input = Vec<Article>;
    type Output = BuildResult;

    fn name(&self) -> &str {
        BUILDER_NAME
    }

    async fn execute(&self, articles: Vec<Article>) -> BuildResult {
        let started = Instant::now();

        let articles_block = format_articles(&articles);
        let today = render_today();
        let prompt = build_builder_prompt(BuilderPromptInput {
            today: &today,
            article_count: articles.len(),
            articles: &articles_block,
            design_instructions: &self.design_instructions,
            recent_designs: &self.context.recent_designs,
            creative_nudge: &self.context.creative_nudge,
        });

        self.sink.info(
            self.name(),
            &format!("Generating page for {} articles", articles.len()),
        );

        let response = match call_model(
            self.llm.as_ref(),
            &self.config.model,
            prompt,
            self.config.max_tokens,
            None,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                self.sink.error(self.name(), &format!("FAILED: {}", e));
                return BuildResult::failed(e.to_string(), started.elapsed());
            }
        };

        let text = response.text();
        let (document, marker_found) = extract_document(&text);
        if !marker_found {
            self.sink.warn(
                self.name(),
                &format!(
                    "No {} found, returning full response",
                    DOCUMENT_START_MARKER
                ),
            );
        }

        BuildResult::completed(document, marker_found, started.elapsed())
    }
}
