//! CLI definition and the single pipeline command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::llm::AnthropicClient;
use crate::pipeline::{Orchestrator, PauseWindow, PipelineConfig, TracingSink};
use crate::prompts::Lineup;

/// Daily news page generator.
#[derive(Parser, Debug)]
#[command(name = "news-forge")]
#[command(about = "Gather, curate and render today's news as a single HTML page")]
#[command(version)]
#[command(
    long_about = "news-forge runs a team of web-searching gatherers, a curator and a page builder.\n\nThe finished HTML page is written to stdout; progress goes to stderr.\n\nExample usage:\n  news-forge --lineup specialized --stage-pause 30-60 > today.html"
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Design instructions for the builder.
    #[arg(short, long)]
    pub prompt_file: Option<PathBuf>,

    /// Design memory store.
    #[arg(short, long)]
    pub memory_file: Option<PathBuf>,

    /// Gatherer lineup (duo, specialized).
    #[arg(long)]
    pub lineup: Option<Lineup>,

    /// Web searches allowed per gatherer, overriding the lineup default.
    #[arg(long)]
    pub max_searches: Option<u32>,

    /// Jittered pause between stages, in seconds ("MIN-MAX" or "SECS").
    #[arg(long)]
    pub stage_pause: Option<PauseWindow>,

    /// Anthropic API key.
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = PipelineConfig::from_env()?;

        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(path) = &self.prompt_file {
            config = config.with_prompt_path(path.clone());
        }
        if let Some(path) = &self.memory_file {
            config = config.with_memory_path(path.clone());
        }
        if let Some(lineup) = self.lineup {
            config = config.with_lineup(lineup);
        }
        if let Some(max) = self.max_searches {
            config = config.with_max_searches(max);
        }
        if let Some(window) = self.stage_pause {
            config = config.with_stage_pause(Some(window));
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse command-line arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Runs the pipeline once and returns the rendered page.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<String> {
    let config = cli.config()?;
    let design_instructions = config.load_design_instructions()?;

    let client = AnthropicClient::with_base_url(
        config.api_key()?,
        &config.api_base,
        config.request_timeout,
    )?;

    info!(
        lineup = %config.lineup,
        prompt = %config.prompt_path.display(),
        memory = %config.memory_path.display(),
        "Starting news pipeline"
    );

    let mut orchestrator = Orchestrator::new(Arc::new(client), config, Arc::new(TracingSink))
        .with_design_instructions(design_instructions);

    Ok(orchestrator.run().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "news-forge",
            "--lineup",
            "specialized",
            "--max-searches",
            "2",
            "--stage-pause",
            "30-60",
            "--memory-file",
            "/tmp/memory.json",
        ])
        .expect("valid arguments");

        assert_eq!(cli.lineup, Some(Lineup::Specialized));
        assert_eq!(cli.max_searches, Some(2));
        assert_eq!(
            cli.stage_pause,
            Some(
                PauseWindow::new(Duration::from_secs(30), Duration::from_secs(60))
                    .expect("valid window")
            )
        );
        assert_eq!(cli.memory_file, Some(PathBuf::from("/tmp/memory.json")));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["news-forge", "--lineup", "trio"]).is_err());
        assert!(Cli::try_parse_from(["news-forge", "--stage-pause", "60-30"]).is_err());
        assert!(Cli::try_parse_from(["news-forge", "--max-searches", "-1"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
