//! Editorial selection prompt.

use super::render_template;

/// Curator prompt template.
pub const CURATOR_PROMPT: &str = r#"Today is {today}.

You are a senior news editor curating today's digest for news.sys.

You have {article_count} articles from {agent_count} specialized agents:

{article_index}

Your task:
1. Select {target_low}-{target_high} articles for today's edition
2. Balance mainstream "everyone's talking about" with niche deep cuts
3. Prefer last 24h but include significant older items if warranted
4. Deduplicate same stories from different sources (pick the best version)
5. Return IDs in the order they should appear on the page

Selection criteria:
- Significance and newsworthiness
- Diversity of topics
- Quality of source
- Reader interest
- Unique insights or angles

Output format (JSON only, no other text):
{
  "selected_uuids": [
    "id-1",
    "id-2",
    ...
  ],
  "reasoning": "Brief explanation of your editorial choices (2-3 sentences)"
}

Return {target_low}-{target_high} IDs in display order, copied exactly from the index.
"#;

/// Renders the curator prompt.
pub fn build_curator_prompt(
    today: &str,
    article_count: usize,
    agent_count: usize,
    article_index: &str,
    target: (usize, usize),
) -> String {
    let (low, high) = target;
    render_template(
        CURATOR_PROMPT,
        &[
            ("today", today),
            ("article_count", &article_count.to_string()),
            ("agent_count", &agent_count.to_string()),
            ("article_index", article_index),
            ("target_low", &low.to_string()),
            ("target_high", &high.to_string()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_curator_prompt() {
        let prompt = build_curator_prompt("October 19, 2026", 13, 2, "ID: abc\n---", (8, 12));

        assert!(prompt.contains("You have 13 articles from 2 specialized agents"));
        assert!(prompt.contains("ID: abc\n---"));
        assert!(prompt.contains("Select 8-12 articles"));
        assert!(prompt.contains("\"selected_uuids\": ["));
        assert!(!prompt.contains("{target_low}"));
    }
}
