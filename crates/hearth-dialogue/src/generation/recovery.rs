//! Recovery of a structured artifact from loosely formatted model output.
//!
//! Attempts run in a fixed order and the first success wins:
//! 1. the whole text as JSON;
//! 2. the body of a fenced code block, preferring one tagged `json`;
//! 3. the largest `{...}` or `[...]` region.
//!
//! Steps 2 and 3 retry once after stripping comments and trailing commas.
//! Only objects and arrays count as artifacts.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```\s*json\s*\n?(.*?)```").unwrap());

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z0-9_-]*\s*\n?(.*?)```").unwrap());

static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[\s,\[{])//[^\n]*").unwrap());

static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());

/// The artifact contained in `text`, if any.
pub fn recover_artifact(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    parse_structured(text)
        .or_else(|| fenced_block(text).and_then(|block| parse_lenient(&block)))
        .or_else(|| {
            bracket_regions(text)
                .into_iter()
                .find_map(|region| parse_lenient(region))
        })
}

/// Remove comments and trailing commas.
pub fn clean_json(text: &str) -> String {
    let text = BLOCK_COMMENT.replace_all(text, "");
    let text = LINE_COMMENT.replace_all(&text, "$1");
    TRAILING_COMMA.replace_all(&text, "$1").into_owned()
}

fn parse_structured(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ (Value::Object(_) | Value::Array(_))) => Some(v),
        _ => None,
    }
}

fn parse_lenient(text: &str) -> Option<Value> {
    parse_structured(text.trim()).or_else(|| parse_structured(clean_json(text).trim()))
}

fn fenced_block(text: &str) -> Option<String> {
    JSON_FENCE
        .captures(text)
        .or_else(|| ANY_FENCE.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Outermost brace and bracket spans, longest first.
fn bracket_regions(text: &str) -> Vec<&str> {
    let mut regions: Vec<&str> = [('{', '}'), ('[', ']')]
        .iter()
        .filter_map(|&(open, close)| {
            let start = text.find(open)?;
            let end = text.rfind(close)?;
            (end > start).then(|| &text[start..=end])
        })
        .collect();
    regions.sort_by_key(|r| std::cmp::Reverse(r.len()));
    regions
}
