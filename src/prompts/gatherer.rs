//! Gathering prompt and gatherer lineups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::NewsCategory;

use super::render_template;

/// Base template shared by every gatherer.
pub const GATHERER_BASE: &str = r#"Today is {today}.

You are a specialized news gathering agent for {beat}.

Your task:
1. Search for recent news (last 24 hours preferred) in your domain
2. Find 5-10 high-quality articles
3. Return results in JSON format

Focus areas for {beat}:
{focus_areas}

Output format (JSON only, no other text):
{
  "articles": [
    {
      "title": "Article headline",
      "summary": "2-3 sentence summary of the article",
      "source_url": "https://...",
      "credibility_tier": 1-3 (1=official/primary, 2=major outlet, 3=blog/social),
      "published_date": "YYYY-MM-DD or null",
      "category": "{categories}"
    }
  ]
}

Prioritize:
- Recent articles (last 24h)
- Diverse sources
- Credible outlets
- Interesting/significant stories
"#;

/// What a single gatherer covers and how much it may search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GathererSpec {
    /// Agent name, also recorded on every article it produces.
    pub name: String,
    /// Human-readable beat shown in the prompt.
    pub beat: String,
    /// Bullet list of topics, already formatted for the prompt.
    pub focus_areas: String,
    /// Categories the gatherer may assign.
    pub categories: Vec<NewsCategory>,
    /// Category used when an article carries none (or an unknown one).
    pub default_category: NewsCategory,
    /// Web search budget for the single call.
    pub max_searches: u32,
}

impl GathererSpec {
    /// A gatherer dedicated to one beat.
    pub fn for_category(category: NewsCategory, max_searches: u32) -> Self {
        let focus_areas = category
            .focus_areas()
            .iter()
            .map(|area| format!("- {}", area))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            name: format!("Gatherer-{}", category.as_str()),
            beat: category.display_name().to_string(),
            focus_areas,
            categories: vec![category],
            default_category: category,
            max_searches,
        }
    }

    /// A gatherer covering several beats at once.
    pub fn for_group(
        name: impl Into<String>,
        beat: impl Into<String>,
        categories: Vec<NewsCategory>,
        default_category: NewsCategory,
        max_searches: u32,
    ) -> Self {
        let focus_areas = categories
            .iter()
            .map(|c| format!("- {}: {}", c.display_name(), c.focus_areas().join("; ")))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            name: name.into(),
            beat: beat.into(),
            focus_areas,
            categories,
            default_category,
            max_searches,
        }
    }

    /// Override the search budget.
    pub fn with_max_searches(mut self, max_searches: u32) -> Self {
        self.max_searches = max_searches;
        self
    }
}

/// Which set of gatherers runs in stage 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lineup {
    /// A broad mainstream gatherer plus a niche "deep cuts" gatherer.
    #[default]
    Duo,
    /// One gatherer per beat.
    Specialized,
}

impl Lineup {
    /// Search budget of the mainstream gatherer in the duo lineup.
    pub const MAINSTREAM_SEARCHES: u32 = 1;
    /// Search budget of every other gatherer.
    pub const DEEP_SEARCHES: u32 = 3;

    /// Builds the gatherer specs for this lineup.
    pub fn specs(&self) -> Vec<GathererSpec> {
        match self {
            Lineup::Duo => vec![
                GathererSpec::for_group(
                    "Gatherer-mainstream",
                    "Mainstream News",
                    NewsCategory::mainstream(),
                    NewsCategory::World,
                    Self::MAINSTREAM_SEARCHES,
                ),
                GathererSpec::for_group(
                    "Gatherer-deep_cuts",
                    "Deep Cuts",
                    NewsCategory::deep_cuts(),
                    NewsCategory::Science,
                    Self::DEEP_SEARCHES,
                ),
            ],
            Lineup::Specialized => NewsCategory::all()
                .into_iter()
                .map(|category| GathererSpec::for_category(category, Self::DEEP_SEARCHES))
                .collect(),
        }
    }
}

impl fmt::Display for Lineup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lineup::Duo => write!(f, "duo"),
            Lineup::Specialized => write!(f, "specialized"),
        }
    }
}

impl FromStr for Lineup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duo" => Ok(Lineup::Duo),
            "specialized" | "specialised" => Ok(Lineup::Specialized),
            other => Err(format!(
                "unknown lineup '{}' (expected 'duo' or 'specialized')",
                other
            )),
        }
    }
}

/// Renders the gathering prompt for `spec` on the given long-form date.
pub fn build_gatherer_prompt(spec: &GathererSpec, today: &str) -> String {
    let categories = if spec.categories.len() == 1 {
        spec.default_category.as_str().to_string()
    } else {
        format!(
            "one of: {}",
            spec.categories
                .iter()
                .map(NewsCategory::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    render_template(
        GATHERER_BASE,
        &[
            ("today", today),
            ("beat", &spec.beat),
            ("focus_areas", &spec.focus_areas),
            ("categories", &categories),
        ],
    )
}
