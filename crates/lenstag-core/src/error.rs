//! Error types for LensTag.
//!
//! Errors are split by where they originate: configuration (fatal at startup),
//! the upstream provider call, and the provider's textual output. Each carries
//! enough context (provider name, status, missing fields) to be reported to the
//! caller as-is.

use thiserror::Error;

/// Top-level error type for LensTag operations.
#[derive(Error, Debug)]
pub enum LensTagError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The inference provider failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider replied but its text is not a valid tag document
    #[error("Malformed output: {0}")]
    Output(#[from] OutputError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// No API key could be resolved for the selected provider
    #[error("{provider} API key not set. Set {env_var} or llm.{provider}.api_key in the config file.")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },

    /// The HTTP client for a provider could not be constructed
    #[error("Failed to build HTTP client for {provider}: {message}")]
    ClientBuild {
        provider: &'static str,
        message: String,
    },
}

/// Failures talking to the inference provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure (DNS, connection refused, TLS, ...)
    #[error("{provider} request failed: {message}")]
    Request {
        provider: &'static str,
        message: String,
    },

    /// Provider answered with a non-2xx status (includes auth rejections)
    #[error("{provider} HTTP {status}: {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Response envelope could not be decoded
    #[error("Failed to parse {provider} response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },

    /// Envelope decoded but carried no text
    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: &'static str },

    /// Provider did not answer within the configured limit
    #[error("{provider} did not respond within {timeout_ms}ms")]
    Timeout {
        provider: &'static str,
        timeout_ms: u64,
    },
}

impl ProviderError {
    /// HTTP status reported by the provider, if it got that far.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure was the local timeout firing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }
}

/// The provider's text could not be turned into a tag document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutputError {
    /// Not valid JSON after fence stripping
    #[error("Model output is not valid JSON: {message}")]
    InvalidJson { message: String },

    /// Valid JSON, but not shaped like the requested schema
    #[error("Model output does not match schema {schema}: {message}")]
    SchemaViolation {
        schema: &'static str,
        message: String,
    },
}

/// Convenience type alias for LensTag results.
pub type Result<T> = std::result::Result<T, LensTagError>;
