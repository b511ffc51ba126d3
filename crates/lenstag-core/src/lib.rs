//! LensTag Core - image tagging through hosted vision models.
//!
//! LensTag forwards an uploaded product image to a multimodal language model
//! together with a fixed instruction prompt, then turns the model's text reply
//! into a validated JSON tag document.
//!
//! # Architecture
//!
//! ```text
//! Upload → base64 → Prompt (schema) → Provider → Strip fences → Parse → Validate → JSON
//! ```
//!
//! There is no local image processing and nothing is stored.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lenstag_core::{Config, Tagger, TaggingRequest};
//!
//! #[tokio::main]
//! async fn main() -> lenstag_core::Result<()> {
//!     let config = Config::load()?;
//!     let tagger = Tagger::from_config(&config)?;
//!
//!     let bytes = std::fs::read("./shirt.jpg")?;
//!     let outcome = tagger.tag(&TaggingRequest::new(bytes, Some("image/jpeg".into()))).await;
//!     println!("{}", outcome.to_body());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod schema;
pub mod tagger;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, ProviderKind};
pub use error::{ConfigError, LensTagError, OutputError, ProviderError, Result};
pub use llm::{LlmProvider, LlmProviderFactory};
pub use output::{parse_output, strip_fences};
pub use schema::{SchemaKind, TagDocument};
pub use tagger::Tagger;
pub use types::{TagOutcome, TaggingRequest};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
