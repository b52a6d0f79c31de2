//! Lenient JSON extraction.
//!
//! Model output frequently wraps JSON in prose or code fences, leaves literal
//! newlines inside string values, adds trailing commas, or stops mid-document
//! when a token limit is hit. [`RobustTextParser::parse`] tries, in order:
//!
//! | Layer | Strategy |
//! |-------|----------|
//! | 1 | The trimmed text as-is |
//! | 2 | The body of the first ```` ``` ```` fence |
//! | 3 | The first balanced `{...}` / `[...]` span |
//! | 4 | The span after a lexer repair pass, then its last safe cut |
//!
//! The repair pass is a three-state lexer (outside a string, inside a
//! string, escape pending) so brackets and commas inside string values are
//! never touched.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no JSON document found in text")]
    NotFound,

    #[error("malformed JSON after repair: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Outside,
    InString,
    EscapePending,
}

/// Repair output: the closed document, plus a cut at the last complete
/// element for when the tail is beyond saving.
struct Repaired {
    primary: String,
    last_safe_cut: Option<String>,
}

pub struct RobustTextParser;

impl RobustTextParser {
    /// Parse the first JSON document found in `text`.
    pub fn parse(text: &str) -> Result<Value, ParseFailure> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParseFailure::NotFound);
        }

        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return Ok(value);
        }

        let body = Self::strip_code_fence(trimmed).unwrap_or(trimmed);
        if let Ok(value) = serde_json::from_str::<Value>(body.trim()) {
            return Ok(value);
        }

        let span = Self::extract_json_span(body).ok_or(ParseFailure::NotFound)?;
        let last_error = match serde_json::from_str::<Value>(span) {
            Ok(value) => return Ok(value),
            Err(e) => e.to_string(),
        };

        let repaired = Self::repair_candidates(span);
        if let Ok(value) = serde_json::from_str::<Value>(&repaired.primary) {
            return Ok(value);
        }
        if let Some(cut) = repaired.last_safe_cut
            && let Ok(value) = serde_json::from_str::<Value>(&cut)
        {
            return Ok(value);
        }

        Err(ParseFailure::Malformed(last_error))
    }

    /// Parse and require a JSON object at the top level.
    pub fn parse_object(text: &str) -> Option<Map<String, Value>> {
        match Self::parse(text) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Body of the first fenced block (language tag skipped); an unclosed
    /// fence runs to the end of the text.
    pub fn strip_code_fence(text: &str) -> Option<&str> {
        let start = text.find("```")?;
        let after = &text[start + 3..];
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(after.len());
        let body = &after[body_start..];
        Some(match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        })
    }

    /// The first `{`/`[` through its matching closer, or through the end of
    /// the text when the document is truncated.
    pub fn extract_json_span(text: &str) -> Option<&str> {
        let start = text.find(['{', '['])?;
        let mut depth = 0usize;
        let mut state = LexState::Outside;

        for (offset, c) in text[start..].char_indices() {
            match state {
                LexState::Outside => match c {
                    '"' => state = LexState::InString,
                    '{' | '[' => depth += 1,
                    '}' | ']' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return Some(&text[start..start + offset + c.len_utf8()]);
                        }
                    }
                    _ => {}
                },
                LexState::InString => match c {
                    '\\' => state = LexState::EscapePending,
                    '"' => state = LexState::Outside,
                    _ => {}
                },
                LexState::EscapePending => state = LexState::InString,
            }
        }

        Some(&text[start..])
    }

    /// Single lexer pass fixing control characters inside strings, trailing
    /// commas, and unterminated strings/containers.
    pub fn repair(text: &str) -> String {
        Self::repair_candidates(text).primary
    }

    fn repair_candidates(text: &str) -> Repaired {
        let mut out = String::with_capacity(text.len() + 8);
        let mut state = LexState::Outside;
        let mut closers: Vec<char> = Vec::new();
        let mut pending_comma = false;
        let mut checkpoint: Option<(usize, Vec<char>)> = None;

        for c in text.chars() {
            match state {
                LexState::Outside => {
                    if c.is_whitespace() {
                        if !pending_comma {
                            out.push(c);
                        }
                        continue;
                    }
                    if pending_comma {
                        pending_comma = false;
                        if c != '}' && c != ']' {
                            checkpoint = Some((out.len(), closers.clone()));
                            out.push(',');
                        }
                    }
                    match c {
                        '"' => {
                            state = LexState::InString;
                            out.push(c);
                        }
                        '{' => {
                            closers.push('}');
                            out.push(c);
                        }
                        '[' => {
                            closers.push(']');
                            out.push(c);
                        }
                        '}' | ']' => {
                            if closers.last() == Some(&c) {
                                closers.pop();
                            }
                            out.push(c);
                        }
                        ',' => pending_comma = true,
                        _ => out.push(c),
                    }
                }
                LexState::InString => match c {
                    '\\' => {
                        state = LexState::EscapePending;
                        out.push(c);
                    }
                    '"' => {
                        state = LexState::Outside;
                        out.push(c);
                    }
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
                    _ => out.push(c),
                },
                LexState::EscapePending => {
                    state = LexState::InString;
                    out.push(c);
                }
            }
        }

        if state == LexState::Outside && closers.is_empty() {
            return Repaired {
                primary: out,
                last_safe_cut: None,
            };
        }

        let mut primary = out.clone();
        match state {
            LexState::EscapePending => {
                primary.pop();
                primary.push('"');
            }
            LexState::InString => primary.push('"'),
            LexState::Outside => {}
        }
        let kept = primary.trim_end().len();
        primary.truncate(kept);
        if primary.ends_with(':') {
            primary.push_str("null");
        }
        primary.extend(closers.iter().rev());

        let last_safe_cut = checkpoint.map(|(len, stack)| {
            let mut cut = out[..len].to_string();
            cut.extend(stack.iter().rev());
            cut
        });

        Repaired {
            primary,
            last_safe_cut,
        }
    }
}

/// String field by any of the given key spellings
pub fn get_str<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| map.get(*k))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Number field by any of the given key spellings; numeric strings and
/// percentages are accepted.
pub fn get_f64(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let value = keys.iter().find_map(|k| map.get(*k))?;
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// List of strings by any of the given key spellings. Objects inside the list
/// are flattened to `"k: v; k: v"`.
pub fn get_string_list(map: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    let Some(value) = keys.iter().find_map(|k| map.get(*k)) else {
        return Vec::new();
    };
    match value {
        Value::Array(items) => items.iter().filter_map(value_to_line).collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn value_to_line(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => {
            let parts: Vec<String> = obj
                .iter()
                .filter_map(|(k, v)| value_to_line(v).map(|line| format!("{k}: {line}")))
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_json_unchanged() {
        let text = r#"{"direct_answer": "Yes", "confidence_level": 0.7, "key_findings": ["a", "b"]}"#;
        let expected: Value = serde_json::from_str(text).unwrap();
        assert_eq!(RobustTextParser::parse(text).unwrap(), expected);
    }

    #[test]
    fn test_unescaped_newline_inside_string() {
        let text = "{\"explanation\": \"first line\nsecond line\", \"confidence\": 0.6}";
        assert!(serde_json::from_str::<Value>(text).is_err());
        let parsed = RobustTextParser::parse(text).unwrap();
        assert_eq!(
            parsed,
            json!({"explanation": "first line\nsecond line", "confidence": 0.6})
        );
    }

    #[test]
    fn test_trailing_commas() {
        let text = r#"{"items": [1, 2, 3,], "name": "x",}"#;
        assert_eq!(
            RobustTextParser::parse(text).unwrap(),
            json!({"items": [1, 2, 3], "name": "x"})
        );
    }

    #[test]
    fn test_code_fence_with_prose() {
        let text = "Here is the result:\n```json\n{\"outcome\": \"both_valid\"}\n```\nThanks.";
        assert_eq!(
            RobustTextParser::parse(text).unwrap(),
            json!({"outcome": "both_valid"})
        );
    }

    #[test]
    fn test_truncated_output_inside_string() {
        let text = r#"{"direct_answer": "Proceed", "key_findings": ["cost is low", "risk is"#;
        assert_eq!(
            RobustTextParser::parse(text).unwrap(),
            json!({"direct_answer": "Proceed", "key_findings": ["cost is low", "risk is"]})
        );
    }

    #[test]
    fn test_truncated_after_colon() {
        let text = r#"{"a": 1, "b": "#;
        assert_eq!(
            RobustTextParser::parse(text).unwrap(),
            json!({"a": 1, "b": null})
        );
    }

    #[test]
    fn test_truncated_mid_key_uses_last_safe_cut() {
        let text = r#"{"a": 1, "bc"#;
        assert_eq!(RobustTextParser::parse(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_brackets_inside_strings_untouched() {
        let text = "{\"note\": \"use [brackets], {braces},\nand commas,\"}";
        assert_eq!(
            RobustTextParser::parse(text).unwrap(),
            json!({"note": "use [brackets], {braces},\nand commas,"})
        );
    }

    #[test]
    fn test_prose_without_json() {
        assert_eq!(
            RobustTextParser::parse("no structure here"),
            Err(ParseFailure::NotFound)
        );
        assert_eq!(RobustTextParser::parse("   "), Err(ParseFailure::NotFound));
    }

    #[test]
    fn test_extract_span_skips_prose() {
        let text = "Answer: {\"a\": {\"b\": \"}\"}} trailing";
        assert_eq!(
            RobustTextParser::extract_json_span(text),
            Some("{\"a\": {\"b\": \"}\"}}")
        );
    }

    #[test]
    fn test_field_helpers() {
        let map = RobustTextParser::parse_object(
            r#"{"confidence": "75%", "nextSteps": ["pilot", {"owner": "ops", "task": "staff"}]}"#,
        )
        .unwrap();
        assert_eq!(get_f64(&map, &["confidence"]), Some(75.0));
        assert_eq!(
            get_string_list(&map, &["next_steps", "nextSteps"]),
            vec!["pilot".to_string(), "owner: ops; task: staff".to_string()]
        );
        assert_eq!(get_str(&map, &["missing"]), None);
    }
}
