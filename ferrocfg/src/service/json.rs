//! Locating a JSON document in free-form service output.

use serde_json::Value;

use crate::error::ServiceError;

const PREVIEW_CHARS: usize = 200;
const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Parse the JSON object a service answered with.
///
/// Tries, in order: the whole response, the first fenced `json` block, and
/// the span from the first `{` to the last `}`.
pub fn extract_json(response: &str) -> Result<Value, ServiceError> {
    if let Ok(value) = serde_json::from_str(response) {
        return Ok(value);
    }

    if let Some(value) = fenced_block(response).and_then(|b| serde_json::from_str(b).ok()) {
        return Ok(value);
    }

    if let Some(value) = brace_span(response).and_then(|s| serde_json::from_str(s).ok()) {
        return Ok(value);
    }

    Err(ServiceError::NoJson {
        preview: response.chars().take(PREVIEW_CHARS).collect(),
    })
}

fn fenced_block(response: &str) -> Option<&str> {
    let start = response.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &response[start..];
    let end = rest.find(FENCE_CLOSE)?;
    Some(rest[..end].trim())
}

fn brace_span(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}
