//! Response parsing for gatherer and curator output.
//!
//! Both schemas go through the same cleanup (see
//! [`crate::utils::json_extraction::clean_response`]) before decoding. Article
//! batches tolerate bad elements; selections tolerate bad identifiers but not
//! an empty result.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ArticleError, ResponseError};
use crate::models::{Article, CredibilityTier, NewsCategory};
use crate::utils::json_extraction::{clean_response, truncation_hint};

/// Date formats accepted for `published_date`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S"];

/// A decoded curator selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Valid identifiers in the order the curator listed them, without duplicates.
    pub ids: Vec<Uuid>,
    /// Editorial rationale, empty when the curator gave none.
    pub reasoning: String,
}

#[derive(Debug, Deserialize)]
struct RawBatch {
    #[serde(default)]
    articles: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    summary: Option<String>,
    source_url: Option<String>,
    #[serde(default)]
    credibility_tier: Value,
    // Optional fields stay loose: a wrong type means "absent", not a bad item.
    #[serde(default)]
    published_date: Value,
    #[serde(default)]
    category: Value,
}

#[derive(Debug, Deserialize)]
struct RawSelection {
    #[serde(alias = "selected_ids")]
    selected_uuids: Vec<Value>,
    #[serde(default)]
    reasoning: Option<String>,
}

fn decode<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, ResponseError> {
    let cleaned = clean_response(raw);
    serde_json::from_str(cleaned).map_err(|source| ResponseError::Malformed {
        raw: raw.to_string(),
        hint: truncation_hint(cleaned),
        source,
    })
}

/// Parses a gatherer response into articles.
///
/// Elements that fail validation are skipped with a warning. A response with
/// no `articles` key yields an empty list.
///
/// # Errors
///
/// Returns [`ResponseError::Malformed`] when the cleaned text is not a JSON
/// object of the expected shape.
pub fn parse_articles(
    raw: &str,
    gathered_by: &str,
    default_category: NewsCategory,
) -> Result<Vec<Article>, ResponseError> {
    let batch: RawBatch = decode(raw)?;
    let total = batch.articles.len();

    let articles: Vec<Article> = batch
        .articles
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| {
            match build_article(element, gathered_by, default_category) {
                Ok(article) => Some(article),
                Err(reason) => {
                    tracing::warn!(agent = gathered_by, index, %reason, "Skipping invalid article");
                    None
                }
            }
        })
        .collect();

    tracing::debug!(
        agent = gathered_by,
        parsed = articles.len(),
        total,
        "Parsed article batch"
    );

    Ok(articles)
}

fn build_article(
    element: Value,
    gathered_by: &str,
    default_category: NewsCategory,
) -> Result<Article, String> {
    let raw: RawArticle = serde_json::from_value(element).map_err(|e| e.to_string())?;

    let credibility = parse_tier(&raw.credibility_tier).map_err(|e| e.to_string())?;
    let category = raw
        .category
        .as_str()
        .and_then(NewsCategory::parse_loose)
        .unwrap_or(default_category);

    let article = Article::new(
        raw.title.unwrap_or_default(),
        raw.summary.unwrap_or_default(),
        raw.source_url.unwrap_or_default(),
    )
    .map_err(|e| e.to_string())?
    .with_category(category)
    .with_credibility(credibility)
    .with_published(raw.published_date.as_str().and_then(parse_published))
    .with_gathered_by(gathered_by);

    Ok(article)
}

/// Missing tiers default to the lowest credibility; numeric strings are accepted.
fn parse_tier(value: &Value) -> Result<CredibilityTier, ArticleError> {
    let number = match value {
        Value::Null => return Ok(CredibilityTier::Alternative),
        Value::Number(n) => n.as_i64().unwrap_or(-1),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(-1),
        _ => -1,
    };
    CredibilityTier::try_from(number)
}

/// Parses a published date in any of the accepted formats.
pub fn parse_published(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parses a curator response into an ordered selection.
///
/// Entries that are not valid identifiers are logged and skipped; repeated
/// identifiers keep their first position.
///
/// # Errors
///
/// Returns [`ResponseError::Malformed`] if the text cannot be decoded and
/// [`ResponseError::NoValidSelection`] if no entry is a valid identifier.
pub fn parse_selection(raw: &str) -> Result<Selection, ResponseError> {
    let selection: RawSelection = decode(raw)?;
    let entries = selection.selected_uuids.len();

    let mut ids: Vec<Uuid> = Vec::with_capacity(entries);
    for (index, entry) in selection.selected_uuids.iter().enumerate() {
        let parsed = entry.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok());
        match parsed {
            Some(id) if ids.contains(&id) => {
                tracing::debug!(index, %id, "Ignoring repeated selection entry");
            }
            Some(id) => ids.push(id),
            None => {
                tracing::warn!(index, entry = %entry, "Invalid identifier in selection");
            }
        }
    }

    if ids.is_empty() {
        return Err(ResponseError::NoValidSelection { entries });
    }

    Ok(Selection {
        ids,
        reasoning: selection.reasoning.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"{
        "articles": [
            {
                "title": "Spacecraft reaches Jupiter",
                "summary": "The spacecraft entered orbit overnight.",
                "source_url": "https://example.org/space/1",
                "credibility_tier": 1,
                "published_date": "2026-10-18"
            },
            {
                "title": "Court rules on merger",
                "summary": "The merger may proceed.",
                "source_url": "https://example.org/legal/2",
                "credibility_tier": "2",
                "published_date": "October 17, 2026",
                "category": "legal_courts"
            }
        ]
    }"#;

    #[test]
    fn test_parse_articles_clean() {
        let articles = parse_articles(BATCH, "Gatherer-deep_cuts", NewsCategory::Space)
            .expect("parses");

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].category, NewsCategory::Space);
        assert_eq!(articles[0].credibility, CredibilityTier::Primary);
        assert_eq!(
            articles[0].published.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2026, 10, 18)
        );
        assert_eq!(articles[1].category, NewsCategory::Legal);
        assert_eq!(articles[1].credibility, CredibilityTier::Major);
        assert!(articles.iter().all(|a| a.gathered_by == "Gatherer-deep_cuts"));
    }

    #[test]
    fn test_parse_articles_wrapped_matches_clean() {
        let wrapped = format!("Here is what I found:\n```json\n{BATCH}\n```");
        let prose = format!("Sure. {BATCH}\nLet me know if you need more.");

        let titles = |raw: &str| -> Vec<String> {
            parse_articles(raw, "g", NewsCategory::World)
                .expect("parses")
                .into_iter()
                .map(|a| a.title)
                .collect()
        };

        assert_eq!(titles(BATCH), titles(&wrapped));
        assert_eq!(titles(BATCH), titles(&prose));
    }

    #[test]
    fn test_parse_articles_skips_invalid_elements() {
        let raw = r#"{"articles": [
            {"title": "Good", "summary": "Fine.", "source_url": "https://example.com/a"},
            {"title": "", "summary": "No title.", "source_url": "https://example.com/b"},
            {"title": "Bad url", "summary": "Nope.", "source_url": "not a url"},
            {"title": "Bad tier", "summary": "Nope.", "source_url": "https://example.com/c", "credibility_tier": 7},
            {"title": 42, "summary": "Wrong type.", "source_url": "https://example.com/d"},
            "just a string"
        ]}"#;

        let articles = parse_articles(raw, "g", NewsCategory::World).expect("parses");
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Good");
        assert_eq!(articles[0].credibility, CredibilityTier::Alternative);
    }

    #[test]
    fn test_parse_articles_fenced_with_trailing_prose() {
        let raw = format!("```json\n{BATCH}\n```\nLet me know if you need more.");
        let articles = parse_articles(&raw, "g", NewsCategory::World).expect("parses");
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].title, "Court rules on merger");
    }

    #[test]
    fn test_parse_articles_loose_optional_fields() {
        let raw = r#"{"articles": [
            {"title": "Numeric date", "summary": "Kept.", "source_url": "https://example.com/a", "published_date": 20261019},
            {"title": "Numeric category", "summary": "Kept.", "source_url": "https://example.com/b", "category": 5},
            {"title": "Null fields", "summary": "Kept.", "source_url": "https://example.com/c", "published_date": null, "category": null}
        ]}"#;

        let articles = parse_articles(raw, "g", NewsCategory::Climate).expect("parses");
        assert_eq!(articles.len(), 3);
        assert!(articles.iter().all(|a| a.published.is_none()));
        assert!(articles.iter().all(|a| a.category == NewsCategory::Climate));
    }

    #[test]
    fn test_parse_articles_all_invalid_is_empty_not_error() {
        let raw = r#"{"articles": [{"title": "x"}, {"summary": "y"}]}"#;
        let articles = parse_articles(raw, "g", NewsCategory::World).expect("parses");
        assert!(articles.is_empty());

        let articles = parse_articles(r#"{"note": "nothing today"}"#, "g", NewsCategory::World)
            .expect("parses");
        assert!(articles.is_empty());
    }

    #[test]
    fn test_parse_articles_malformed_keeps_raw() {
        let raw = "I could not find any news today, sorry.";
        let err = parse_articles(raw, "g", NewsCategory::World).expect_err("should fail");

        assert!(matches!(err, ResponseError::Malformed { .. }));
        assert_eq!(err.raw_response(), Some(raw));
        assert!(err.to_string().contains("no JSON object"));
    }

    #[test]
    fn test_parse_articles_truncated_hint() {
        let raw = r#"{"articles": [{"title": "Cut off"#;
        let err = parse_articles(raw, "g", NewsCategory::World).expect_err("should fail");
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_parse_published_formats() {
        assert!(parse_published("2026-10-18").is_some());
        assert!(parse_published("2026-10-18T09:30:00").is_some());
        assert!(parse_published("October 18, 2026").is_some());
        assert!(parse_published("yesterday").is_none());
        assert!(parse_published("").is_none());
    }

    #[test]
    fn test_parse_selection() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!(
            "```json\n{{\"selected_uuids\": [\"{b}\", \"{a}\", \"{b}\"], \"reasoning\": \"Balanced.\"}}\n```"
        );

        let selection = parse_selection(&raw).expect("parses");
        assert_eq!(selection.ids, vec![b, a]);
        assert_eq!(selection.reasoning, "Balanced.");
    }

    #[test]
    fn test_parse_selection_skips_invalid_entries() {
        let valid = Uuid::new_v4();
        let raw = format!(
            r#"{{"selected_uuids": ["not-a-uuid", "{valid}", 17], "reasoning": "Mixed."}}"#
        );

        let selection = parse_selection(&raw).expect("parses");
        assert_eq!(selection.ids, vec![valid]);
    }

    #[test]
    fn test_parse_selection_accepts_alias_and_missing_reasoning() {
        let id = Uuid::new_v4();
        let raw = format!(r#"{{"selected_ids": ["{id}"]}}"#);

        let selection = parse_selection(&raw).expect("parses");
        assert_eq!(selection.ids, vec![id]);
        assert!(selection.reasoning.is_empty());
    }

    #[test]
    fn test_parse_selection_none_valid() {
        let raw = r#"{"selected_uuids": ["one", "two"], "reasoning": "x"}"#;
        let err = parse_selection(raw).expect_err("should fail");
        assert!(matches!(err, ResponseError::NoValidSelection { entries: 2 }));
    }

    #[test]
    fn test_parse_selection_missing_list_is_malformed() {
        let err = parse_selection(r#"{"reasoning": "forgot the list"}"#).expect_err("should fail");
        assert!(matches!(err, ResponseError::Malformed { .. }));
    }
}
