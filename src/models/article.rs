//! News articles and their classification.

use chrono::NaiveDateTime;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ArticleError;

/// Source credibility classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum CredibilityTier {
    /// Official sources and primary documents.
    Primary = 1,
    /// Established news outlets.
    Major = 2,
    /// Blogs, social media, unverified.
    Alternative = 3,
}

impl CredibilityTier {
    /// Numeric tier as shown to the model (1-3).
    pub fn as_number(&self) -> i64 {
        *self as i64
    }
}

impl Default for CredibilityTier {
    fn default() -> Self {
        CredibilityTier::Alternative
    }
}

impl TryFrom<i64> for CredibilityTier {
    type Error = ArticleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CredibilityTier::Primary),
            2 => Ok(CredibilityTier::Major),
            3 => Ok(CredibilityTier::Alternative),
            other => Err(ArticleError::InvalidCredibilityTier(other)),
        }
    }
}

impl From<CredibilityTier> for i64 {
    fn from(tier: CredibilityTier) -> Self {
        tier.as_number()
    }
}

impl std::fmt::Display for CredibilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tier {}", self.as_number())
    }
}

/// News beats covered by the gatherers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    #[serde(rename = "politics_policy")]
    Politics,
    #[serde(rename = "business_markets")]
    Business,
    Sports,
    Entertainment,
    #[serde(rename = "world_affairs")]
    World,
    #[serde(rename = "viral_cultural")]
    Viral,
    #[serde(rename = "medical_research")]
    Medical,
    #[serde(rename = "scientific_discoveries")]
    Science,
    #[serde(rename = "regulatory_filings")]
    Regulatory,
    #[serde(rename = "financial_filings")]
    Financial,
    #[serde(rename = "legal_courts")]
    Legal,
    #[serde(rename = "climate_environment")]
    Climate,
    #[serde(rename = "space_aerospace")]
    Space,
    #[serde(rename = "ai_emerging_tech")]
    AiTech,
    #[serde(rename = "corrections_retractions")]
    Corrections,
}

impl NewsCategory {
    /// Returns all categories, mainstream beats first.
    pub fn all() -> Vec<NewsCategory> {
        vec![
            NewsCategory::Politics,
            NewsCategory::Business,
            NewsCategory::Sports,
            NewsCategory::Entertainment,
            NewsCategory::World,
            NewsCategory::Viral,
            NewsCategory::Medical,
            NewsCategory::Science,
            NewsCategory::Regulatory,
            NewsCategory::Financial,
            NewsCategory::Legal,
            NewsCategory::Climate,
            NewsCategory::Space,
            NewsCategory::AiTech,
            NewsCategory::Corrections,
        ]
    }

    /// Returns the mainstream beats.
    pub fn mainstream() -> Vec<NewsCategory> {
        Self::all().into_iter().filter(|c| c.is_mainstream()).collect()
    }

    /// Returns the niche beats.
    pub fn deep_cuts() -> Vec<NewsCategory> {
        Self::all().into_iter().filter(|c| !c.is_mainstream()).collect()
    }

    /// Whether this beat belongs to the mainstream group.
    pub fn is_mainstream(&self) -> bool {
        matches!(
            self,
            NewsCategory::Politics
                | NewsCategory::Business
                | NewsCategory::Sports
                | NewsCategory::Entertainment
                | NewsCategory::World
                | NewsCategory::Viral
        )
    }

    /// Stable identifier used in prompts and persisted data.
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsCategory::Politics => "politics_policy",
            NewsCategory::Business => "business_markets",
            NewsCategory::Sports => "sports",
            NewsCategory::Entertainment => "entertainment",
            NewsCategory::World => "world_affairs",
            NewsCategory::Viral => "viral_cultural",
            NewsCategory::Medical => "medical_research",
            NewsCategory::Science => "scientific_discoveries",
            NewsCategory::Regulatory => "regulatory_filings",
            NewsCategory::Financial => "financial_filings",
            NewsCategory::Legal => "legal_courts",
            NewsCategory::Climate => "climate_environment",
            NewsCategory::Space => "space_aerospace",
            NewsCategory::AiTech => "ai_emerging_tech",
            NewsCategory::Corrections => "corrections_retractions",
        }
    }

    /// Returns the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            NewsCategory::Politics => "Politics & Policy",
            NewsCategory::Business => "Business & Markets",
            NewsCategory::Sports => "Sports",
            NewsCategory::Entertainment => "Entertainment",
            NewsCategory::World => "World Affairs",
            NewsCategory::Viral => "Viral & Cultural",
            NewsCategory::Medical => "Medical Research",
            NewsCategory::Science => "Scientific Discoveries",
            NewsCategory::Regulatory => "Regulatory Filings",
            NewsCategory::Financial => "Financial Filings",
            NewsCategory::Legal => "Legal & Court Decisions",
            NewsCategory::Climate => "Climate & Environment",
            NewsCategory::Space => "Space & Aerospace",
            NewsCategory::AiTech => "AI & Emerging Tech",
            NewsCategory::Corrections => "Corrections & Retractions",
        }
    }

    /// Returns the topics a gatherer on this beat should look for.
    pub fn focus_areas(&self) -> &'static [&'static str] {
        match self {
            NewsCategory::Politics => &[
                "Federal/state legislation",
                "Political campaigns and elections",
                "Policy debates and proposals",
                "Government appointments",
                "Congressional actions",
            ],
            NewsCategory::Business => &[
                "Stock market movements",
                "Major corporate announcements",
                "Earnings reports",
                "Mergers and acquisitions",
                "Economic indicators",
            ],
            NewsCategory::Sports => &[
                "Game results and highlights",
                "Player trades and signings",
                "Championships and tournaments",
                "Sports controversies",
                "Record-breaking performances",
            ],
            NewsCategory::Entertainment => &[
                "Movie and TV releases",
                "Celebrity news",
                "Awards shows",
                "Music releases",
                "Entertainment industry news",
            ],
            NewsCategory::World => &[
                "International conflicts",
                "Diplomatic relations",
                "Global crises",
                "International policy",
                "Cross-border events",
            ],
            NewsCategory::Viral => &[
                "Trending social media stories",
                "Internet phenomena",
                "Cultural moments",
                "Memes and viral content",
                "Pop culture trends",
            ],
            NewsCategory::Medical => &[
                "Clinical trial results",
                "New treatments and therapies",
                "Disease research",
                "Public health studies",
                "Medical breakthroughs",
            ],
            NewsCategory::Science => &[
                "Research publications",
                "Scientific breakthroughs",
                "Physics, chemistry, biology discoveries",
                "Academic research",
                "Scientific controversies",
            ],
            NewsCategory::Regulatory => &[
                "SEC filings",
                "FCC announcements",
                "EPA regulations",
                "FDA approvals/warnings",
                "Government regulatory actions",
            ],
            NewsCategory::Financial => &[
                "Corporate financial disclosures",
                "Bankruptcy filings",
                "Major financial statements",
                "Insider trading reports",
                "Financial regulatory actions",
            ],
            NewsCategory::Legal => &[
                "Supreme Court rulings",
                "Major court cases",
                "Legal precedents",
                "Corporate lawsuits",
                "Criminal justice news",
            ],
            NewsCategory::Climate => &[
                "Climate research",
                "Environmental policy",
                "Natural disasters",
                "Conservation efforts",
                "Renewable energy",
            ],
            NewsCategory::Space => &[
                "Space missions",
                "Astronomical discoveries",
                "Satellite launches",
                "Space exploration",
                "Aerospace technology",
            ],
            NewsCategory::AiTech => &[
                "AI developments",
                "Machine learning breakthroughs",
                "Emerging technologies",
                "Tech policy",
                "Future tech trends",
            ],
            NewsCategory::Corrections => &[
                "Media corrections",
                "Story retractions",
                "Fact-check updates",
                "Clarifications on major stories",
                "Journalistic accountability",
            ],
        }
    }

    /// Looks a category up by its identifier or display name, case-insensitively.
    pub fn parse_loose(value: &str) -> Option<NewsCategory> {
        let wanted = value.trim();
        Self::all().into_iter().find(|c| {
            c.as_str().eq_ignore_ascii_case(wanted) || c.display_name().eq_ignore_ascii_case(wanted)
        })
    }
}

impl std::fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single news article gathered from the web.
///
/// Construction validates the mandatory fields; once built an article is
/// never modified by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Identifier, unique for the run.
    pub id: Uuid,
    /// Headline.
    pub title: String,
    /// Two or three sentence summary.
    pub summary: String,
    /// Absolute http(s) URL of the source.
    pub source_url: String,
    /// Beat this article belongs to.
    pub category: NewsCategory,
    /// How trustworthy the source is.
    pub credibility: CredibilityTier,
    /// Publication time, when the model reported a parseable one.
    pub published: Option<NaiveDateTime>,
    /// Name of the gatherer that produced this article.
    pub gathered_by: String,
}

impl Article {
    /// Creates a validated article with a fresh identifier.
    ///
    /// Category defaults to world affairs and credibility to tier 3 until set.
    ///
    /// # Errors
    ///
    /// Fails if the title or summary is blank or if the source is not an
    /// absolute http(s) URL with a host.
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Result<Self, ArticleError> {
        let title = title.into().trim().to_string();
        let summary = summary.into().trim().to_string();
        let source_url = source_url.into().trim().to_string();

        if title.is_empty() {
            return Err(ArticleError::MissingTitle);
        }
        if summary.is_empty() {
            return Err(ArticleError::MissingSummary);
        }
        validate_source_url(&source_url)?;

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            summary,
            source_url,
            category: NewsCategory::World,
            credibility: CredibilityTier::default(),
            published: None,
            gathered_by: String::new(),
        })
    }

    /// Set the category.
    pub fn with_category(mut self, category: NewsCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the credibility tier.
    pub fn with_credibility(mut self, credibility: CredibilityTier) -> Self {
        self.credibility = credibility;
        self
    }

    /// Set the publication time.
    pub fn with_published(mut self, published: Option<NaiveDateTime>) -> Self {
        self.published = published;
        self
    }

    /// Set the producing gatherer's name.
    pub fn with_gathered_by(mut self, gatherer: impl Into<String>) -> Self {
        self.gathered_by = gatherer.into();
        self
    }
}

fn validate_source_url(raw: &str) -> Result<(), ArticleError> {
    let invalid = |reason: &str| ArticleError::InvalidSourceUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}
