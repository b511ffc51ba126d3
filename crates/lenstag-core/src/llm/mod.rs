//! LLM integration for image tagging.
//!
//! Provides a provider abstraction over the supported vision backends
//! (OpenAI, Gemini). Exactly one provider is built at startup and shared by
//! every request.

pub(crate) mod gemini;
pub(crate) mod openai;
pub(crate) mod provider;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use provider::{
    resolve_env_var, ImageInput, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse,
};
