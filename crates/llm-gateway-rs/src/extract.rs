use crate::error::{GatewayError, Result};
use serde_json::Value;

/// Recover a JSON value from free-form LLM output.
///
/// Tries a direct parse first (well-behaved responses), then the interior
/// of a fenced code block, then the first balanced `{...}` span. The order
/// is fixed: direct parse is the cheapest and the most reliable, so it must
/// come first.
pub fn extract_json(content: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str(content.trim()) {
        return Ok(value);
    }
    if let Some(inner) = fenced_block(content) {
        if let Ok(value) = serde_json::from_str(inner) {
            return Ok(value);
        }
    }
    if let Some(span) = balanced_object(content) {
        if let Ok(value) = serde_json::from_str(span) {
            return Ok(value);
        }
    }
    Err(GatewayError::JsonExtraction)
}

/// Interior of the first ``` or ```json fence, trimmed.
fn fenced_block(content: &str) -> Option<&str> {
    let start = content.find("```")? + 3;
    let rest = &content[start..];
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// First balanced top-level object span, skipping braces inside strings.
fn balanced_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, b) in content.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
