//! Page rendering prompt.

use super::render_template;

/// Builder prompt template. Design instructions come from the prompt file.
pub const BUILDER_PROMPT: &str = r#"Today is {today}.

You are building today's news.sys webpage.

Here are the {article_count} selected articles:

{articles}

{design_instructions}

{recent_designs}

{creative_nudge}

Begin the page with <!DOCTYPE html> and include a single HTML comment of the form
<!-- DESIGN BRIEF: one or two sentences describing today's visual approach -->
so tomorrow's designer can avoid repeating it.

IMPORTANT: Use the actual article data provided above. Each article should expand on click to show its full summary and source link.
"#;

/// Values substituted into [`BUILDER_PROMPT`].
#[derive(Debug, Clone, Copy)]
pub struct BuilderPromptInput<'a> {
    pub today: &'a str,
    pub article_count: usize,
    pub articles: &'a str,
    pub design_instructions: &'a str,
    pub recent_designs: &'a str,
    pub creative_nudge: &'a str,
}

/// Renders the builder prompt.
///
/// Articles and design instructions are substituted verbatim. An empty
/// context block drops its template line together with the blank line after it.
pub fn build_builder_prompt(input: BuilderPromptInput<'_>) -> String {
    let mut empty_slots = Vec::new();
    if input.recent_designs.trim().is_empty() {
        empty_slots.push("{recent_designs}");
    }
    if input.creative_nudge.trim().is_empty() {
        empty_slots.push("{creative_nudge}");
    }

    render_template(
        &without_slot_lines(BUILDER_PROMPT, &empty_slots),
        &[
            ("today", input.today),
            ("article_count", &input.article_count.to_string()),
            ("articles", input.articles),
            ("design_instructions", input.design_instructions),
            ("recent_designs", input.recent_designs),
            ("creative_nudge", input.creative_nudge),
        ],
    )
}

/// Removes template lines that hold only one of `slots`, plus the blank line following each.
fn without_slot_lines(template: &str, slots: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut skip_blank = false;
    for line in template.lines() {
        if slots.contains(&line.trim()) {
            skip_blank = true;
            continue;
        }
        if skip_blank && line.trim().is_empty() {
            skip_blank = false;
            continue;
        }
        skip_blank = false;
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_builder_prompt() {
        let prompt = build_builder_prompt(BuilderPromptInput {
            today: "October 19, 2026",
            article_count: 2,
            articles: "Article 1:\nTitle: A\n---",
            design_instructions: "Design a page.\n",
            recent_designs: "<recent_designs>\nNone\n</recent_designs>",
            creative_nudge: "",
        });

        assert!(prompt.starts_with("Today is October 19, 2026."));
        assert!(prompt.contains("Here are the 2 selected articles"));
        assert!(prompt.contains("Design a page."));
        assert!(prompt.contains("<recent_designs>"));
        assert!(!prompt.contains("<creative_nudge>"));
        assert!(!prompt.contains("{creative_nudge}"));
        assert!(prompt.contains("</recent_designs>\n\nBegin the page"));
    }

    #[test]
    fn test_builder_prompt_keeps_instructions_and_articles_verbatim() {
        let instructions = "Palette:\n\n\n\n  - ink black\n\n\nLayout: broadsheet";
        let articles = "Article 1:\nTitle: A\nSummary: First.\n\n\nSecond paragraph.\n---";
        let prompt = build_builder_prompt(BuilderPromptInput {
            today: "October 19, 2026",
            article_count: 1,
            articles,
            design_instructions: instructions,
            recent_designs: "",
            creative_nudge: "",
        });

        assert!(prompt.contains(instructions));
        assert!(prompt.contains(articles));
        assert!(prompt.contains(&format!("{instructions}\n\nBegin the page")));
    }
}
