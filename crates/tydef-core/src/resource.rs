//! # Resource Parsing
//!
//! Each definition arrives as a YAML or JSON string. This module is the
//! boundary where those strings are handed to `serde_yaml` / `serde_json`;
//! nothing downstream ever inspects raw text.

use serde_json::Value;

use crate::error::ParseError;

/// Parse a resource string into a JSON value.
///
/// Text whose first non-whitespace character is `{` is parsed as JSON;
/// anything else is parsed as YAML straight into a JSON value tree, so a
/// resource may only use the JSON-compatible subset of YAML (string map
/// keys, no tags).
///
/// # Errors
///
/// Returns [`ParseError`] carrying the original text and the parser's
/// message if the text is malformed.
pub fn parse_resource(raw: &str) -> Result<Value, ParseError> {
    let fail = |reason: String| ParseError {
        raw: raw.to_string(),
        reason,
    };

    if raw.trim_start().starts_with('{') {
        serde_json::from_str(raw).map_err(|e| fail(format!("invalid JSON: {e}")))
    } else {
        serde_yaml::from_str(raw).map_err(|e| fail(format!("invalid YAML: {e}")))
    }
}
