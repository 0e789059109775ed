//! Pulling a JSON object out of free-form model output
//!
//! Models asked for JSON still wrap it in code fences, prepend reasoning in
//! `<think>` blocks, or add a sentence before the object. Each strategy is
//! tried in order until one parses.

use serde_json::Value;

/// Extract the first JSON object from model output
pub fn extract_json_object(content: &str) -> Option<Value> {
    let content = strip_reasoning(content).trim();

    parse_object(content)
        .or_else(|| fenced_block(content).and_then(parse_object))
        .or_else(|| outer_braces(content).and_then(parse_object))
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Drop a leading `<think>...</think>` reasoning block
pub fn strip_reasoning(content: &str) -> &str {
    match content.find("</think>") {
        Some(end) => &content[end + "</think>".len()..],
        None => content,
    }
}

fn fenced_block(content: &str) -> Option<&str> {
    let start = content.find("```")?;
    let after_fence = &content[start + 3..];
    // Skip the language tag line ("json", "JSON", ...)
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

fn outer_braces(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}
