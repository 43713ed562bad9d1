//! Pipeline configuration for the orchestrator.
//!
//! This module provides configuration options for the news pipeline:
//! model selection, the gatherer lineup and search budgets, file locations,
//! selection thresholds and the optional rate-limit pause between stages.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::agents::{AgentConfig, CuratorConfig, DEFAULT_CURATOR_MODEL, DEFAULT_WORKER_MODEL};
use crate::llm::client::DEFAULT_API_BASE;
use crate::prompts::{GathererSpec, Lineup};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// The design instruction file could not be read.
    #[error("Could not read design instructions from '{path}': {source}")]
    PromptFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Uniform window for the jittered pause between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseWindow {
    pub min: Duration,
    pub max: Duration,
}

impl PauseWindow {
    /// Creates a window; `min` must not exceed `max`.
    pub fn new(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::ValidationFailed(format!(
                "stage pause minimum ({}s) exceeds maximum ({}s)",
                min.as_secs(),
                max.as_secs()
            )));
        }
        Ok(Self { min, max })
    }

    /// Pause length for a uniform draw `fraction` in `[0, 1]`.
    pub fn at(&self, fraction: f64) -> Duration {
        let span = self.max.saturating_sub(self.min);
        self.min + span.mul_f64(fraction.clamp(0.0, 1.0))
    }
}

impl fmt::Display for PauseWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min.as_secs(), self.max.as_secs())
    }
}

impl FromStr for PauseWindow {
    type Err = String;

    /// Parses `"MIN-MAX"` or a single `"SECS"`, both in whole seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("could not parse '{}' as seconds", part.trim()))
        };

        let (min, max) = match s.split_once('-') {
            Some((min, max)) => (parse(min)?, parse(max)?),
            None => {
                let secs = parse(s)?;
                (secs, secs)
            }
        };

        PauseWindow::new(min, max).map_err(|e| e.to_string())
    }
}

/// Configuration for the news pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // Service
    /// API key for the generative service; required before a run starts.
    pub api_key: Option<String>,
    /// Base URL of the Messages API.
    pub api_base: String,
    /// Per-request timeout.
    pub request_timeout: Duration,

    // Models
    pub gatherer_model: String,
    pub curator_model: String,
    pub builder_model: String,

    // Stage 1
    /// Which gatherers run.
    pub lineup: Lineup,
    /// Overrides every gatherer's search budget when set.
    pub max_searches: Option<u32>,
    /// Fewer gathered articles than this aborts the run before curation.
    pub min_articles: usize,

    // Stage 2
    /// Fewer resolvable selections than this fails the run.
    pub min_selected: usize,
    /// Selections beyond this are dropped.
    pub max_selected: usize,

    // Stage 3
    /// File holding the page design instructions.
    pub prompt_path: PathBuf,
    /// Design memory store.
    pub memory_path: PathBuf,
    /// How many past designs the builder is shown.
    pub recent_designs: usize,

    /// Optional jittered pause between stages.
    pub stage_pause: Option<PauseWindow>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(600),
            gatherer_model: DEFAULT_WORKER_MODEL.to_string(),
            curator_model: DEFAULT_CURATOR_MODEL.to_string(),
            builder_model: DEFAULT_WORKER_MODEL.to_string(),
            lineup: Lineup::default(),
            max_searches: None,
            min_articles: 10,
            min_selected: 5,
            max_selected: 12,
            prompt_path: PathBuf::from("prompt.txt"),
            memory_path: PathBuf::from("design_memory.json"),
            recent_designs: 3,
            stage_pause: None,
        }
    }
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `ANTHROPIC_API_KEY`: API key (checked later by [`Self::api_key`])
    /// - `ANTHROPIC_API_BASE`: API base URL
    /// - `NEWS_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 600)
    /// - `NEWS_GATHERER_MODEL`, `NEWS_CURATOR_MODEL`, `NEWS_BUILDER_MODEL`: Model overrides
    /// - `NEWS_LINEUP`: `duo` or `specialized` (default: duo)
    /// - `MAX_SEARCHES`: Search budget for every gatherer
    /// - `NEWS_MIN_ARTICLES`: Gathering threshold (default: 10)
    /// - `NEWS_MIN_SELECTED` / `NEWS_MAX_SELECTED`: Selection bounds (default: 5 / 12)
    /// - `PROMPT_PATH`: Design instruction file (default: prompt.txt)
    /// - `NEWS_MEMORY_PATH`: Design memory store (default: design_memory.json)
    /// - `NEWS_STAGE_PAUSE_SECS`: `MIN-MAX` pause between stages (default: none)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Service settings
        if let Ok(val) = std::env::var("ANTHROPIC_API_KEY") {
            if !val.trim().is_empty() {
                config.api_key = Some(val);
            }
        }

        if let Ok(val) = std::env::var("ANTHROPIC_API_BASE") {
            config.api_base = val;
        }

        if let Ok(val) = std::env::var("NEWS_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "NEWS_REQUEST_TIMEOUT_SECS")?;
            config.request_timeout = Duration::from_secs(secs);
        }

        // Models
        if let Ok(val) = std::env::var("NEWS_GATHERER_MODEL") {
            config.gatherer_model = val;
        }

        if let Ok(val) = std::env::var("NEWS_CURATOR_MODEL") {
            config.curator_model = val;
        }

        if let Ok(val) = std::env::var("NEWS_BUILDER_MODEL") {
            config.builder_model = val;
        }

        // Gathering
        if let Ok(val) = std::env::var("NEWS_LINEUP") {
            config.lineup = parse_env_value(&val, "NEWS_LINEUP")?;
        }

        if let Ok(val) = std::env::var("MAX_SEARCHES") {
            config.max_searches = Some(parse_env_value(&val, "MAX_SEARCHES")?);
        }

        if let Ok(val) = std::env::var("NEWS_MIN_ARTICLES") {
            config.min_articles = parse_env_value(&val, "NEWS_MIN_ARTICLES")?;
        }

        // Curation
        if let Ok(val) = std::env::var("NEWS_MIN_SELECTED") {
            config.min_selected = parse_env_value(&val, "NEWS_MIN_SELECTED")?;
        }

        if let Ok(val) = std::env::var("NEWS_MAX_SELECTED") {
            config.max_selected = parse_env_value(&val, "NEWS_MAX_SELECTED")?;
        }

        // Files
        if let Ok(val) = std::env::var("PROMPT_PATH") {
            config.prompt_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("NEWS_MEMORY_PATH") {
            config.memory_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("NEWS_STAGE_PAUSE_SECS") {
            config.stage_pause = parse_pause(&val, "NEWS_STAGE_PAUSE_SECS")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "api_base cannot be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        for (name, model) in [
            ("gatherer_model", &self.gatherer_model),
            ("curator_model", &self.curator_model),
            ("builder_model", &self.builder_model),
        ] {
            if model.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }

        if self.max_searches == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "max_searches must be greater than 0".to_string(),
            ));
        }

        if self.min_articles == 0 {
            return Err(ConfigError::ValidationFailed(
                "min_articles must be greater than 0".to_string(),
            ));
        }

        if self.min_selected == 0 {
            return Err(ConfigError::ValidationFailed(
                "min_selected must be greater than 0".to_string(),
            ));
        }

        if self.min_selected > self.max_selected {
            return Err(ConfigError::ValidationFailed(format!(
                "min_selected ({}) cannot exceed max_selected ({})",
                self.min_selected, self.max_selected
            )));
        }

        if self.recent_designs == 0 {
            return Err(ConfigError::ValidationFailed(
                "recent_designs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The API key, or a configuration error naming the variable to set.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()))
    }

    /// Gatherers for the configured lineup, with the search override applied.
    pub fn gatherer_specs(&self) -> Vec<GathererSpec> {
        let specs = self.lineup.specs();
        match self.max_searches {
            Some(max) => specs
                .into_iter()
                .map(|spec| spec.with_max_searches(max))
                .collect(),
            None => specs,
        }
    }

    /// Gatherer model settings.
    pub fn gatherer_agent(&self) -> AgentConfig {
        AgentConfig::gatherer().with_model(self.gatherer_model.clone())
    }

    /// Curator settings; the prompt asks for 8 up to `max_selected`.
    pub fn curator(&self) -> CuratorConfig {
        let target_low = 8usize.max(self.min_selected).min(self.max_selected);
        CuratorConfig {
            agent: AgentConfig::curator().with_model(self.curator_model.clone()),
            ..CuratorConfig::default()
        }
        .with_target(target_low, self.max_selected)
    }

    /// Builder model settings.
    pub fn builder_agent(&self) -> AgentConfig {
        AgentConfig::builder().with_model(self.builder_model.clone())
    }

    /// Reads the design instructions passed verbatim to the builder.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::PromptFile` if the file cannot be read.
    pub fn load_design_instructions(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.prompt_path).map_err(|source| ConfigError::PromptFile {
            path: self.prompt_path.display().to_string(),
            source,
        })
    }

    // Builder methods

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the gatherer lineup.
    pub fn with_lineup(mut self, lineup: Lineup) -> Self {
        self.lineup = lineup;
        self
    }

    /// Override every gatherer's search budget.
    pub fn with_max_searches(mut self, max: u32) -> Self {
        self.max_searches = Some(max);
        self
    }

    /// Set the gathering threshold.
    pub fn with_min_articles(mut self, min: usize) -> Self {
        self.min_articles = min;
        self
    }

    /// Set the selection bounds.
    pub fn with_selection_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_selected = min;
        self.max_selected = max;
        self
    }

    /// Set the design instruction file.
    pub fn with_prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_path = path.into();
        self
    }

    /// Set the design memory store.
    pub fn with_memory_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.memory_path = path.into();
        self
    }

    /// Set the pause between stages.
    pub fn with_stage_pause(mut self, pause: Option<PauseWindow>) -> Self {
        self.stage_pause = pause;
        self
    }
}

/// Parse an environment variable value.
fn parse_env_value<T>(value: &str, key: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}': {}", value, e),
    })
}

/// Parse a pause window; empty, `0` and `off` disable the pause.
fn parse_pause(value: &str, key: &str) -> Result<Option<PauseWindow>, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "off" | "none" => Ok(None),
        _ => parse_env_value(value, key).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.gatherer_model, "claude-sonnet-4-5-20250929");
        assert_eq!(config.curator_model, "claude-opus-4-5-20251101");
        assert_eq!(config.lineup, Lineup::Duo);
        assert_eq!(config.min_articles, 10);
        assert_eq!(config.prompt_path, PathBuf::from("prompt.txt"));
        assert_eq!(config.memory_path, PathBuf::from("design_memory.json"));
        assert!(config.stage_pause.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::new()
            .with_api_key("secret")
            .with_lineup(Lineup::Specialized)
            .with_max_searches(2)
            .with_selection_bounds(6, 10);

        assert_eq!(config.api_key().ok(), Some("secret"));
        let specs = config.gatherer_specs();
        assert_eq!(specs.len(), 15);
        assert!(specs.iter().all(|s| s.max_searches == 2));

        let curator = config.curator();
        assert_eq!(curator.target_low, 8);
        assert_eq!(curator.max_selected, 10);
    }

    #[test]
    fn test_curator_target_respects_bounds() {
        let config = PipelineConfig::new().with_selection_bounds(3, 6);
        let curator = config.curator();
        assert_eq!(curator.target_low, 6);
        assert_eq!(curator.max_selected, 6);
    }

    #[test]
    fn test_missing_api_key() {
        let err = PipelineConfig::new().api_key().expect_err("no key");
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "ANTHROPIC_API_KEY"));

        let blank = PipelineConfig::new().with_api_key("   ");
        assert!(blank.api_key().is_err());
    }

    #[test]
    fn test_validation_selection_bounds() {
        let config = PipelineConfig::new().with_selection_bounds(9, 4);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));

        let config = PipelineConfig::new().with_selection_bounds(0, 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_searches_and_threshold() {
        assert!(PipelineConfig::new().with_max_searches(0).validate().is_err());
        assert!(PipelineConfig::new().with_min_articles(0).validate().is_err());
    }

    #[test]
    fn test_validation_empty_model() {
        let mut config = PipelineConfig::new();
        config.builder_model = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pause_window_parse() {
        let window: PauseWindow = "30-180".parse().expect("valid window");
        assert_eq!(window.min, Duration::from_secs(30));
        assert_eq!(window.max, Duration::from_secs(180));
        assert_eq!(window.to_string(), "30-180");

        let fixed: PauseWindow = "45".parse().expect("valid window");
        assert_eq!(fixed.min, fixed.max);

        assert!("180-30".parse::<PauseWindow>().is_err());
        assert!("soon".parse::<PauseWindow>().is_err());
    }

    #[test]
    fn test_pause_window_at() {
        let window = PauseWindow::new(Duration::from_secs(30), Duration::from_secs(90))
            .expect("valid window");
        assert_eq!(window.at(0.0), Duration::from_secs(30));
        assert_eq!(window.at(0.5), Duration::from_secs(60));
        assert_eq!(window.at(1.0), Duration::from_secs(90));
        assert_eq!(window.at(7.0), Duration::from_secs(90));
    }

    #[test]
    fn test_parse_pause_disabled() {
        assert_eq!(parse_pause("off", "K").expect("parses"), None);
        assert_eq!(parse_pause("0", "K").expect("parses"), None);
        assert!(parse_pause("10-20", "K").expect("parses").is_some());
        assert!(matches!(
            parse_pause("x-y", "K"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_design_instructions_missing_file() {
        let config = PipelineConfig::new().with_prompt_path("/nonexistent/prompt.txt");
        let err = config.load_design_instructions().expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/prompt.txt"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "NEWS_LINEUP".to_string(),
            message: "unknown lineup 'trio'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for NEWS_LINEUP: unknown lineup 'trio'"
        );
    }
}
