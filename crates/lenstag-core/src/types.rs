//! Core data types: what comes in with a tagging call and what goes out.
//!
//! Both are ephemeral. A request lives for one HTTP call and is dropped once
//! the provider has answered; nothing is persisted.

use crate::error::{OutputError, ProviderError};
use crate::schema::TagDocument;
use serde_json::{json, Value};

/// An uploaded image waiting to be tagged.
#[derive(Debug, Clone, Default)]
pub struct TaggingRequest {
    /// Raw upload bytes, never inspected or validated locally
    pub bytes: Vec<u8>,

    /// Caller-declared MIME type, trusted as-is
    pub content_type: Option<String>,

    /// Original file name, for logs only
    pub file_name: Option<String>,
}

impl TaggingRequest {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// The result of one tagging call.
///
/// Never an `Err`: every failure after startup is one of these variants so
/// the caller always gets a JSON body describing what happened.
#[derive(Debug)]
pub enum TagOutcome {
    /// Provider replied with a document matching the schema
    Tagged {
        document: TagDocument,
        model: String,
        latency_ms: u64,
        tokens_used: Option<u32>,
    },

    /// The provider call itself failed
    UpstreamError(ProviderError),

    /// Provider replied, but the text is not a valid document
    MalformedOutput {
        error: OutputError,
        raw_output: String,
    },
}

impl TagOutcome {
    pub fn is_tagged(&self) -> bool {
        matches!(self, TagOutcome::Tagged { .. })
    }

    /// JSON body sent to the caller.
    ///
    /// - `Tagged`: the schema document itself
    /// - `UpstreamError`: `{"error": ...}`
    /// - `MalformedOutput`: `{"error": ..., "raw_output": <provider text verbatim>}`
    pub fn to_body(&self) -> Value {
        match self {
            TagOutcome::Tagged { document, .. } => json!(document),
            TagOutcome::UpstreamError(err) => json!({ "error": err.to_string() }),
            TagOutcome::MalformedOutput { error, raw_output } => json!({
                "error": error.to_string(),
                "raw_output": raw_output,
            }),
        }
    }
}
