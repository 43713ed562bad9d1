//! Daily news pipeline.
//!
//! # Pipeline Flow
//!
//! 1. **Gathering**: every configured gatherer searches its beat concurrently
//! 2. **Gate**: the run stops unless enough articles were gathered
//! 3. **Curation**: one curator selects and orders the day's articles
//! 4. **Build**: the builder renders a self-contained HTML page
//! 5. **Memory**: the page's design brief is stored for future runs
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use news_forge::llm::AnthropicClient;
//! use news_forge::pipeline::{Orchestrator, PipelineConfig, TracingSink};
//!
//! let config = PipelineConfig::from_env()?;
//! let client = AnthropicClient::new(config.api_key()?, config.request_timeout)?;
//!
//! let mut orchestrator = Orchestrator::new(Arc::new(client), config, Arc::new(TracingSink));
//! let html = orchestrator.run().await?;
//! println!("{}", html);
//! ```

pub mod config;
pub mod diagnostics;
pub mod orchestrator;
pub mod state;

pub use config::{ConfigError, PauseWindow, PipelineConfig};
pub use diagnostics::{
    DiagnosticSink, Level, RecordingSink, RunEvent, Stage, StageReport, TracingSink,
};
pub use orchestrator::{Orchestrator, PipelineError};
pub use state::PipelineState;
