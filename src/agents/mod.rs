//! News agents.
//!
//! Three agents share one capability, [`Agent::execute`], but differ in what
//! they take and return:
//!
//! | Agent | Input | Output |
//! |-------|-------|--------|
//! | [`GathererAgent`] | nothing (beat fixed at construction) | [`AgentResult`](crate::models::AgentResult) |
//! | [`CuratorAgent`] | all gathered articles | [`CurationResult`](crate::models::CurationResult) |
//! | [`BuilderAgent`] | curated articles | [`BuildResult`](crate::models::BuildResult) |
//!
//! All three talk to the model through [`common::call_model`] and report
//! failures on their result rather than returning an error.

use async_trait::async_trait;

pub mod builder;
pub mod common;
pub mod curator;
pub mod error;
pub mod gatherer;
pub mod parser;

pub use builder::{
    escape_html, extract_document, format_articles, BuilderAgent, BuilderContext,
    DOCUMENT_START_MARKER,
};
pub use common::{AgentConfig, DEFAULT_CURATOR_MODEL, DEFAULT_WORKER_MODEL};
pub use curator::{build_article_index, CuratorAgent, CuratorConfig};
pub use error::{AgentError, AgentOutcome};
pub use gatherer::GathererAgent;
pub use parser::{parse_articles, parse_selection, Selection};

/// A runnable pipeline stage.
#[async_trait]
pub trait Agent: Send + Sync {
    type Input: Send + 'static;
    type Output: Send;

    /// Name used in diagnostics and on results.
    fn name(&self) -> &str;

    /// Runs the stage. Failures are reported on the output, never raised.
    async fn execute(&self, input: Self::Input) -> Self::Output;
}
