//! JSON extraction utilities for parsing LLM responses.
//!
//! Model output is nominally JSON but routinely arrives wrapped in markdown
//! code fences or surrounded by explanatory prose. The helpers here reduce
//! such text to the single JSON object it contains:
//!
//! 1. Trim whitespace
//! 2. Strip a leading code fence line and a matching closing fence
//! 3. Slice from the first `{` to the last `}` if the text does not start with `{`
//!
//! # Example
//!
//! ```
//! use news_forge::utils::json_extraction::clean_response;
//!
//! let response = "```json\n{\"articles\": []}\n```";
//! assert_eq!(clean_response(response), "{\"articles\": []}");
//!
//! let chatty = "Here you go: {\"reasoning\": \"ok\"} Let me know!";
//! assert_eq!(clean_response(chatty), "{\"reasoning\": \"ok\"}");
//! ```

/// Marker that opens and closes a markdown code block.
const FENCE: &str = "```";

/// Analysis result for JSON structure
#[derive(Debug, Clone, PartialEq)]
pub struct JsonStructureAnalysis {
    /// Number of unclosed braces ('{' without matching '}')
    pub unclosed_braces: usize,
    /// Number of unclosed brackets ('[' without matching ']')
    pub unclosed_brackets: usize,
    /// Whether we ended inside a string literal
    pub in_string: bool,
    /// The position where JSON-like content starts (first '{' or '[')
    pub json_start: Option<usize>,
}

impl JsonStructureAnalysis {
    /// Whether the scanned text looks like JSON that was cut off mid-way.
    pub fn is_truncated(&self) -> bool {
        self.json_start.is_some()
            && (self.unclosed_braces > 0 || self.unclosed_brackets > 0 || self.in_string)
    }
}

/// Analyzes JSON structure to determine if content is truncated
///
/// Scans the content and tracks brace/bracket depth, ignoring anything that
/// appears inside string literals.
pub fn analyze_json_structure(s: &str) -> JsonStructureAnalysis {
    let mut brace_depth: isize = 0;
    let mut bracket_depth: isize = 0;
    let mut in_string = false;
    let mut escape_next = false;
    let mut json_start: Option<usize> = None;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '{' if !in_string => {
                if json_start.is_none() {
                    json_start = Some(i);
                }
                brace_depth += 1;
            }
            '}' if !in_string => {
                brace_depth -= 1;
            }
            '[' if !in_string => {
                if json_start.is_none() {
                    json_start = Some(i);
                }
                bracket_depth += 1;
            }
            ']' if !in_string => {
                bracket_depth -= 1;
            }
            _ => {}
        }
    }

    JsonStructureAnalysis {
        unclosed_braces: brace_depth.max(0) as usize,
        unclosed_brackets: bracket_depth.max(0) as usize,
        in_string,
        json_start,
    }
}

/// Strips a surrounding markdown code fence.
///
/// If the trimmed text begins with a fence marker, its first line (the
/// opening fence plus any language tag) is dropped, and the last line is
/// dropped too when it is a bare closing fence. Text without a leading fence
/// is returned trimmed but otherwise untouched.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with(FENCE) {
        return trimmed;
    }

    let body = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => return "",
    };

    let body = body.trim_end();
    match body.rfind('\n') {
        Some(newline) if body[newline + 1..].trim() == FENCE => &body[..newline],
        None if body.trim() == FENCE => "",
        _ => body,
    }
}

/// Slices out the outermost object when prose surrounds it.
///
/// Text that already starts with `{` and ends with `}` is returned as is.
/// Otherwise the slice runs from the first `{` to the last `}`; if no such
/// pair exists the text is returned unchanged and decoding will report the
/// problem.
pub fn slice_outer_object(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return trimmed;
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Reduces a raw response to the JSON object it most likely contains.
pub fn clean_response(content: &str) -> &str {
    slice_outer_object(strip_code_fence(content))
}

/// Human-readable hint explaining a decode failure, or an empty string.
///
/// Output budgets cut long responses off mid-document; naming that case
/// saves a trip through the raw text when diagnosing a failed run.
pub fn truncation_hint(cleaned: &str) -> String {
    let analysis = analyze_json_structure(cleaned);
    if analysis.json_start.is_none() {
        return " (no JSON object found in response)".to_string();
    }
    if analysis.is_truncated() {
        return format!(
            " (response appears truncated: {} unclosed braces, {} unclosed brackets{})",
            analysis.unclosed_braces,
            analysis.unclosed_brackets,
            if analysis.in_string {
                ", inside a string"
            } else {
                ""
            }
        );
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence_json_block() {
        let content = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(content), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fence_without_closing() {
        let content = "```\n{\"a\": 1}";
        assert_eq!(strip_code_fence(content), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fence_leaves_plain_text() {
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fence_keeps_prose_after_fence() {
        let content = "```json\n{\"a\": 1}\n```\nHope this helps";
        // The last line is not a fence, so only the opening line goes.
        assert_eq!(strip_code_fence(content), "{\"a\": 1}\n```\nHope this helps");
    }

    #[test]
    fn test_strip_code_fence_only_marker() {
        assert_eq!(strip_code_fence("```"), "");
        assert_eq!(strip_code_fence("```json\n```"), "");
    }

    #[test]
    fn test_slice_outer_object_with_prose() {
        let content = "Sure! Here it is:\n{\"a\": {\"b\": 2}}\nAnything else?";
        assert_eq!(slice_outer_object(content), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn test_slice_outer_object_without_braces() {
        assert_eq!(slice_outer_object("no json here"), "no json here");
    }

    #[test]
    fn test_slice_outer_object_trailing_prose() {
        let content = "{\"a\": {\"b\": 2}}\n```\nLet me know if you need more.";
        assert_eq!(slice_outer_object(content), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn test_slice_outer_object_keeps_truncated_text() {
        let content = r#"{"articles": [{"title": "Cut"#;
        assert_eq!(slice_outer_object(content), content);
    }

    #[test]
    fn test_clean_response_fence_then_prose() {
        let content = "```json\n{\"a\": 1}\n```\nHope this helps";
        assert_eq!(clean_response(content), "{\"a\": 1}");

        let content = "Result:\n```json\n{\"a\": 1}\n```";
        assert_eq!(clean_response(content), "{\"a\": 1}");
    }

    #[test]
    fn test_analyze_json_structure_complete() {
        let analysis = analyze_json_structure(r#"{"a": [1, 2], "b": "}"}"#);
        assert_eq!(analysis.unclosed_braces, 0);
        assert_eq!(analysis.unclosed_brackets, 0);
        assert!(!analysis.in_string);
        assert_eq!(analysis.json_start, Some(0));
        assert!(!analysis.is_truncated());
    }

    #[test]
    fn test_analyze_json_structure_truncated() {
        let analysis = analyze_json_structure(r#"{"articles": [{"title": "Cut"#);
        assert_eq!(analysis.unclosed_braces, 2);
        assert_eq!(analysis.unclosed_brackets, 1);
        assert!(analysis.in_string);
        assert!(analysis.is_truncated());
    }

    #[test]
    fn test_truncation_hint() {
        assert!(truncation_hint(r#"{"a": [1"#).contains("truncated"));
        assert!(truncation_hint("plain words").contains("no JSON object"));
        assert_eq!(truncation_hint(r#"{"a": 1,}"#), "");
    }
}
