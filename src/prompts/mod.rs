//! LLM prompts for the three pipeline stages.
//!
//! - [`gatherer`] - Base gathering prompt, beat profiles and gatherer lineups
//! - [`curator`] - Editorial selection prompt
//! - [`builder`] - Page rendering prompt
//!
//! Templates use `{name}` placeholders filled by [`render_template`]. Values
//! are substituted in a single pass, so text coming from the model (titles,
//! summaries) can never introduce further placeholders.
//!
//! ```
//! use news_forge::prompts::render_template;
//!
//! let text = render_template("Today is {today}. {\"x\": 1}", &[("today", "October 19, 2026")]);
//! assert_eq!(text, "Today is October 19, 2026. {\"x\": 1}");
//! ```

pub mod builder;
pub mod curator;
pub mod gatherer;

pub use builder::{build_builder_prompt, BuilderPromptInput, BUILDER_PROMPT};
pub use curator::{build_curator_prompt, CURATOR_PROMPT};
pub use gatherer::{build_gatherer_prompt, GathererSpec, Lineup, GATHERER_BASE};

/// Replaces every `{key}` whose key appears in `vars`; anything else is copied verbatim.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template_single_pass() {
        let rendered = render_template(
            "A={a} B={b}",
            &[("a", "{b}"), ("b", "bee")],
        );
        assert_eq!(rendered, "A={b} B=bee");
    }

    #[test]
    fn test_render_template_keeps_unknown_and_json() {
        let template = "{\n  \"articles\": [{unknown}]\n} {today}";
        let rendered = render_template(template, &[("today", "now")]);
        assert_eq!(rendered, "{\n  \"articles\": [{unknown}]\n} now");
    }

    #[test]
    fn test_render_template_unclosed_brace() {
        assert_eq!(render_template("tail {today", &[("today", "x")]), "tail {today");
    }
}
