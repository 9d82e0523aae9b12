//! Tolerant handling of upstream response bodies.

use serde_json::{json, Value};

/// Parse `text` as JSON, or wrap it as `{"raw": text}`.
///
/// Upstream error pages are not always JSON; this keeps them attachable to
/// an error response as-is.
pub fn lenient_json(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}
