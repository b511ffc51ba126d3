//! Cleanup and parsing of the model's raw text reply.
//!
//! Models regularly wrap JSON in markdown fences even when told not to, so
//! fences are stripped before parsing.

use crate::error::OutputError;
use crate::schema::{SchemaKind, TagDocument};

/// Remove a surrounding markdown code fence (```` ```json ... ``` ````) and trim.
///
/// Only fences at the very start and end are removed; text without fences is
/// returned trimmed.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string ("json", "JSON", ...) if present.
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Strip fences, parse as JSON, and validate against `schema`.
pub fn parse_output(raw: &str, schema: SchemaKind) -> Result<TagDocument, OutputError> {
    let cleaned = strip_fences(raw);
    let value: serde_json::Value =
        serde_json::from_str(cleaned).map_err(|e| OutputError::InvalidJson {
            message: e.to_string(),
        })?;
    schema.validate(value)
}
