//! Data model shared by the agents and the pipeline.

pub mod article;
pub mod results;

pub use article::{Article, CredibilityTier, NewsCategory};
pub use results::{AgentResult, BuildResult, CurationResult};
