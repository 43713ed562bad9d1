//! Pipeline orchestrator for the daily news page.
//!
//! Drives the three stages in order:
//! - Stage 1: every gatherer runs concurrently; results merge in launch order
//! - Gate: too few articles aborts before curation
//! - Stage 2: the curator selects and orders articles
//! - Stage 3: the builder renders the page, then the design memory is updated
//!
//! A stage report is emitted for every stage that starts, whether it
//! succeeds or not.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use rand::RngExt;
use thiserror::Error;

use crate::agents::{
    Agent, AgentError, BuilderAgent, BuilderContext, CuratorAgent, GathererAgent,
};
use crate::diversity::{extract_summary, format_recent, DesignMemory, HistoryOrder, NudgeGenerator};
use crate::llm::LlmProvider;
use crate::models::{AgentResult, Article};

use super::config::{ConfigError, PipelineConfig};
use super::diagnostics::{DiagnosticSink, RunEvent, Stage, StageReport};
use super::state::PipelineState;

/// Source name for orchestrator diagnostics.
const ORCHESTRATOR: &str = "Orchestrator";

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Stage 1 produced too little to curate.
    #[error("Insufficient articles gathered: {gathered} (need at least {required})")]
    InsufficientData { gathered: usize, required: usize },

    /// Curation failed or produced too small a selection.
    #[error("Curation failed: {0}")]
    CurationFailed(String),

    /// Page rendering failed.
    #[error("Build failed: {0}")]
    BuildFailed(String),
}

/// Runs one end-to-end pipeline.
pub struct Orchestrator {
    llm: Arc<dyn LlmProvider>,
    config: PipelineConfig,
    sink: Arc<dyn DiagnosticSink>,
    memory: DesignMemory,
    nudges: NudgeGenerator,
    design_instructions: Option<String>,
    state: PipelineState,
}

impl Orchestrator {
    /// Creates an orchestrator using the memory store and prompt file named in `config`.
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        config: PipelineConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let memory = DesignMemory::new(config.memory_path.clone());
        Self {
            llm,
            config,
            sink,
            memory,
            nudges: NudgeGenerator::new(),
            design_instructions: None,
            state: PipelineState::new(),
        }
    }

    /// Use a specific design memory store.
    pub fn with_memory(mut self, memory: DesignMemory) -> Self {
        self.memory = memory;
        self
    }

    /// Use a specific nudge generator (e.g. a seeded one).
    pub fn with_nudges(mut self, nudges: NudgeGenerator) -> Self {
        self.nudges = nudges;
        self
    }

    /// Use these design instructions instead of reading the prompt file.
    pub fn with_design_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.design_instructions = Some(instructions.into());
        self
    }

    /// State of the most recent run.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Executes the full pipeline and returns the rendered page.
    ///
    /// # Errors
    ///
    /// Returns a `PipelineError` for invalid configuration, too few gathered
    /// articles, or a failed curation or build. Individual gatherer failures
    /// are not errors.
    pub async fn run(&mut self) -> Result<String, PipelineError> {
        self.state = PipelineState::new();
        let run_started = Instant::now();

        self.config.validate()?;
        let instructions = match &self.design_instructions {
            Some(instructions) => instructions.clone(),
            None => self.config.load_design_instructions()?,
        };

        let outcome = self.run_stages(instructions).await;
        self.state.finish();

        match &outcome {
            Ok(html) => self.sink.info(
                ORCHESTRATOR,
                &format!(
                    "Pipeline complete in {:.1}s ({} characters)",
                    run_started.elapsed().as_secs_f64(),
                    html.len()
                ),
            ),
            Err(e) => self.sink.error(ORCHESTRATOR, &e.to_string()),
        }

        outcome
    }

    async fn run_stages(&mut self, instructions: String) -> Result<String, PipelineError> {
        self.gather().await;

        let gathered = self.state.total_articles();
        if gathered < self.config.min_articles {
            return Err(PipelineError::InsufficientData {
                gathered,
                required: self.config.min_articles,
            });
        }

        self.pause().await;
        self.curate().await?;

        self.pause().await;
        let html = self.build(instructions).await?;

        self.remember(&html);
        Ok(html)
    }

    /// Stage 1: launch every gatherer, then wait for all of them.
    async fn gather(&mut self) {
        let specs = self.config.gatherer_specs();
        self.sink.emit(RunEvent::StageStarted(Stage::Gathering));
        self.sink.info(
            ORCHESTRATOR,
            &format!("Launching {} gatherers", specs.len()),
        );

        let started = Instant::now();
        let agent_config = self.config.gatherer_agent();

        let (names, handles): (Vec<String>, Vec<_>) = specs
            .into_iter()
            .map(|spec| {
                let agent = GathererAgent::new(
                    Arc::clone(&self.llm),
                    spec,
                    agent_config.clone(),
                    Arc::clone(&self.sink),
                );
                let name = agent.name().to_string();
                let handle = tokio::spawn(async move { agent.execute(()).await });
                (name, handle)
            })
            .unzip();

        let joined = futures::future::join_all(handles).await;

        let results: Vec<AgentResult> = names
            .into_iter()
            .zip(joined)
            .map(|(name, outcome)| match outcome {
                Ok(result) => result,
                Err(e) => {
                    let error = AgentError::Aborted(e.to_string());
                    self.sink.error(&name, &format!("FAILED: {}", error));
                    AgentResult::pending(name).failed(error.to_string(), started.elapsed())
                }
            })
            .collect();

        self.state.record_gathering(results);
        self.sink
            .emit(RunEvent::StageFinished(self.gathering_report(started.elapsed())));
    }

    fn gathering_report(&self, elapsed: Duration) -> StageReport {
        let mut report = StageReport::new(Stage::Gathering, elapsed)
            .with_counts(self.state.successful_agents(), self.state.failed_agents())
            .with_detail(format!("Total articles: {}", self.state.total_articles()));

        let mut succeeded: Vec<&AgentResult> =
            self.state.agent_results().iter().filter(|r| r.success).collect();
        succeeded.sort_by_key(|r| std::cmp::Reverse(r.len()));

        for result in succeeded {
            report = report.with_detail(format!(
                "{}: {} articles ({} searches, {:.1}s)",
                result.agent_name,
                result.len(),
                result.search_count,
                result.elapsed.as_secs_f64()
            ));
        }

        for result in self.state.agent_results().iter().filter(|r| !r.success) {
            report = report.with_detail(format!(
                "{} failed: {}",
                result.agent_name,
                result.error.as_deref().unwrap_or("unknown error")
            ));
        }

        report
    }

    /// Stage 2: select and order articles.
    async fn curate(&mut self) -> Result<(), PipelineError> {
        self.sink.emit(RunEvent::StageStarted(Stage::Curation));
        let started = Instant::now();

        let curator = CuratorAgent::new(
            Arc::clone(&self.llm),
            self.config.curator(),
            Arc::clone(&self.sink),
        );
        let candidates: Vec<Article> = self.state.all_articles().into_iter().cloned().collect();
        let result = curator.execute(candidates).await;

        let success = result.success;
        let error = result.error.clone();
        let reasoning = result.reasoning.clone();
        let requested = result.selected_ids.len();
        self.state.record_curation(result);
        let resolved = self.state.selected_articles().len();

        let failure = if !success {
            Some(error.unwrap_or_else(|| "unknown error".to_string()))
        } else if resolved < self.config.min_selected {
            Some(format!(
                "only {} of {} selected articles match gathered articles (need at least {})",
                resolved, requested, self.config.min_selected
            ))
        } else {
            None
        };

        let mut report = StageReport::new(Stage::Curation, started.elapsed());
        report = match &failure {
            None => report
                .with_counts(1, 0)
                .with_detail(format!("Selected: {} articles", resolved))
                .with_detail(format!("Reasoning: {}", reasoning)),
            Some(reason) => report.with_counts(0, 1).with_detail(reason.clone()),
        };
        if success && resolved < requested {
            report = report.with_detail(format!(
                "{} selected identifiers matched no gathered article",
                requested - resolved
            ));
        }
        self.sink.emit(RunEvent::StageFinished(report));

        match failure {
            Some(reason) => Err(PipelineError::CurationFailed(reason)),
            None => Ok(()),
        }
    }

    /// Stage 3: render the page with memory and nudge context.
    async fn build(&mut self, instructions: String) -> Result<String, PipelineError> {
        self.sink.emit(RunEvent::StageStarted(Stage::Build));
        let started = Instant::now();

        let recent = self
            .memory
            .recent(self.config.recent_designs, HistoryOrder::NewestFirst);
        let nudge = self.nudges.generate();

        if nudge.is_active() {
            self.sink
                .info(ORCHESTRATOR, &format!("Creative nudge: {}", nudge.kind));
        }
        if !recent.is_empty() {
            self.sink.info(
                ORCHESTRATOR,
                &format!("Memory: {} recent designs loaded", recent.len()),
            );
        }

        let builder = BuilderAgent::new(
            Arc::clone(&self.llm),
            self.config.builder_agent(),
            instructions,
            Arc::clone(&self.sink),
        )
        .with_context(BuilderContext {
            recent_designs: format_recent(&recent),
            creative_nudge: nudge.render(),
        });

        let selected: Vec<Article> = self
            .state
            .selected_articles()
            .into_iter()
            .cloned()
            .collect();
        let result = builder.execute(selected).await;

        let report = StageReport::new(Stage::Build, started.elapsed());
        let outcome = if result.success {
            let mut report = report
                .with_counts(1, 0)
                .with_detail(format!("HTML size: {} characters", result.html.len()));
            if !result.marker_found {
                report = report.with_detail("Document start marker missing");
            }
            self.sink.emit(RunEvent::StageFinished(report));
            Ok(result.html.clone())
        } else {
            let reason = result
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            self.sink.emit(RunEvent::StageFinished(
                report.with_counts(0, 1).with_detail(reason.clone()),
            ));
            Err(PipelineError::BuildFailed(reason))
        };

        self.state.record_build(result);
        outcome
    }

    /// Saves today's design brief. Failure here never fails the run.
    fn remember(&self, html: &str) {
        let summary = extract_summary(html, Local::now().date_naive());
        match self.memory.save(summary) {
            Ok(()) => self.sink.info(ORCHESTRATOR, "Design summary saved to memory"),
            Err(e) => self
                .sink
                .warn(ORCHESTRATOR, &format!("Could not save design summary: {}", e)),
        }
    }

    /// Jittered rate-limit pause, when configured.
    async fn pause(&self) {
        let Some(window) = self.config.stage_pause else {
            return;
        };

        let fraction: f64 = rand::rng().random_range(0.0..=1.0);
        let wait = window.at(fraction);
        self.sink.info(
            ORCHESTRATOR,
            &format!("Pausing {:.0}s before the next stage", wait.as_secs_f64()),
        );
        tokio::time::sleep(wait).await;
    }
}
