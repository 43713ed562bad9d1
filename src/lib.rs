//! news-forge: a daily news page generator.
//!
//! A team of web-searching gatherers collects candidate articles, a curator
//! picks and orders the day's selection, and a builder renders it as one
//! self-contained HTML page whose design avoids repeating recent days.

// Core modules
pub mod agents;
pub mod cli;
pub mod diversity;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod utils;

// Re-export commonly used types
pub use error::{ArticleError, LlmError, MemoryError, ResponseError};
pub use models::{AgentResult, Article, BuildResult, CredibilityTier, CurationResult, NewsCategory};
pub use pipeline::{Orchestrator, PipelineConfig, PipelineError};
