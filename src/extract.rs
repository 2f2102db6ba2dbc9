//! Locate and parse the JSON object inside free-form model output.

use serde_json::Value;

use crate::error::{CouncilError, Result};

/// Greedy span from the first `{` to the last `}`.
///
/// Models sometimes wrap the object in prose or code fences; everything outside
/// the outermost braces is discarded. Returns `None` when there is no `{`
/// followed by a `}`.
pub fn find_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Extract the first top-level object span and parse it.
pub fn extract_json_object(raw: &str) -> Result<Value> {
    let span = find_json_span(raw).ok_or(CouncilError::NoJsonFound)?;
    serde_json::from_str(span).map_err(|e| {
        tracing::debug!(span_len = span.len(), "JSON span failed to parse: {}", e);
        CouncilError::Parse {
            message: e.to_string(),
        }
    })
}
