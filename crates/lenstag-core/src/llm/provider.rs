//! LLM provider trait and request/response types.
//!
//! Defines the interface that all inference providers implement, plus the
//! factory that creates the configured provider once at startup.

use crate::config::{Config, ProviderKind};
use crate::error::{ConfigError, ProviderError};
use crate::schema::SchemaKind;
use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw upload bytes and the caller's content type.
    ///
    /// The content type is trusted as-is when it names an image; anything
    /// else (missing, `application/octet-stream`, ...) is sent as `image/jpeg`.
    /// The bytes themselves are never inspected.
    pub fn from_bytes(bytes: &[u8], content_type: Option<&str>) -> Self {
        let media_type = match content_type.map(|ct| ct.trim().to_ascii_lowercase()) {
            Some(ct) if ct.starts_with("image/") => ct,
            Some(other) => {
                tracing::debug!("Non-image content type '{other}', sending as image/jpeg");
                "image/jpeg".to_string()
            }
            None => "image/jpeg".to_string(),
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type,
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A request to tag an image.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The image to tag
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl LlmRequest {
    /// Build a tagging request using the schema's fixed prompt.
    pub fn tag_image(image: ImageInput, schema: SchemaKind) -> Self {
        Self {
            image,
            prompt: schema.prompt().to_string(),
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

/// The response from a provider call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text exactly as the provider returned it
    pub text: String,
    /// Model identifier reported by the provider
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all inference providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai", "gemini").
    fn name(&self) -> &'static str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send the image and prompt, returning the model's text reply.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub(crate) fn build_client(provider: &'static str) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .user_agent(concat!("lenstag/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::ClientBuild {
            provider,
            message: e.to_string(),
        })
}

/// Factory that creates the configured provider.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the provider selected by `config.tagging.provider`.
    ///
    /// Fails when no API key can be resolved, so a misconfigured process
    /// refuses to start instead of failing on its first request.
    pub fn create(config: &Config) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        let model_override = config.tagging.model.as_deref();

        match config.tagging.provider {
            ProviderKind::Openai => {
                let cfg = config.llm.openai.clone().unwrap_or_default();
                let api_key =
                    resolve_env_var(&cfg.api_key).ok_or(ConfigError::MissingCredential {
                        provider: "openai",
                        env_var: "OPENAI_API_KEY",
                    })?;
                let model = model_override.unwrap_or(cfg.model.as_str());
                Ok(Arc::new(super::openai::OpenAiProvider::with_endpoint(
                    &api_key,
                    model,
                    &cfg.endpoint,
                )?))
            }
            ProviderKind::Gemini => {
                let cfg = config.llm.gemini.clone().unwrap_or_default();
                let api_key =
                    resolve_env_var(&cfg.api_key).ok_or(ConfigError::MissingCredential {
                        provider: "gemini",
                        env_var: "GEMINI_API_KEY",
                    })?;
                let model = model_override.unwrap_or(cfg.model.as_str());
                Ok(Arc::new(super::gemini::GeminiProvider::with_endpoint(
                    &api_key,
                    model,
                    &cfg.endpoint,
                )?))
            }
        }
    }
}
