//! The tagging gateway: image in, validated tag document (or a typed failure) out.
//!
//! One `Tagger` is built at startup and shared behind an `Arc`. It holds no
//! mutable state, so concurrent calls are fully independent.

use crate::config::Config;
use crate::error::{ConfigError, ProviderError};
use crate::llm::{ImageInput, LlmProvider, LlmProviderFactory, LlmRequest};
use crate::output::parse_output;
use crate::schema::SchemaKind;
use crate::types::{TagOutcome, TaggingRequest};
use std::sync::Arc;
use std::time::Duration;

pub struct Tagger {
    provider: Arc<dyn LlmProvider>,
    schema: SchemaKind,
    timeout: Duration,
}

impl Tagger {
    pub fn new(provider: Arc<dyn LlmProvider>, schema: SchemaKind, timeout: Duration) -> Self {
        Self {
            provider,
            schema,
            timeout,
        }
    }

    /// Build the configured provider and wrap it.
    ///
    /// Fails on missing credentials so the process never starts half-configured.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let provider = LlmProviderFactory::create(config)?;
        let schema = config.tagging.effective_schema();
        tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            schema = schema.version(),
            "Tagger ready"
        );
        Ok(Self::new(
            provider,
            schema,
            Duration::from_millis(config.limits.llm_timeout_ms),
        ))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn schema(&self) -> SchemaKind {
        self.schema
    }

    /// Tag one image.
    ///
    /// Exactly one provider call is made, even for empty or non-image
    /// uploads; rejecting them is left to the provider.
    pub async fn tag(&self, request: &TaggingRequest) -> TagOutcome {
        let image = ImageInput::from_bytes(&request.bytes, request.content_type.as_deref());
        let llm_request = LlmRequest::tag_image(image, self.schema);

        tracing::debug!(
            file = request.file_name.as_deref().unwrap_or("<unnamed>"),
            bytes = request.bytes.len(),
            media_type = %llm_request.image.media_type,
            "Sending image to {}",
            self.provider.name()
        );

        let response =
            match tokio::time::timeout(self.timeout, self.provider.generate(&llm_request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    tracing::warn!("Provider call failed: {e}");
                    return TagOutcome::UpstreamError(e);
                }
                Err(_) => {
                    let e = ProviderError::Timeout {
                        provider: self.provider.name(),
                        timeout_ms: self.timeout.as_millis() as u64,
                    };
                    tracing::warn!("{e}");
                    return TagOutcome::UpstreamError(e);
                }
            };

        match parse_output(&response.text, self.schema) {
            Ok(document) => {
                tracing::info!(
                    model = %response.model,
                    latency_ms = response.latency_ms,
                    tags = document.tags().len(),
                    "Image tagged"
                );
                TagOutcome::Tagged {
                    document,
                    model: response.model,
                    latency_ms: response.latency_ms,
                    tokens_used: response.tokens_used,
                }
            }
            Err(error) => {
                tracing::warn!(model = %response.model, "Unusable model output: {error}");
                TagOutcome::MalformedOutput {
                    error,
                    raw_output: response.text,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutputError;
    use crate::llm::LlmResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// A configurable mock provider.
    struct MockProvider {
        response_fn: Box<dyn Fn() -> Result<LlmResponse, ProviderError> + Send + Sync>,
        call_count: Arc<AtomicU32>,
        /// Last request seen, for assertions on what was sent.
        last_request: Arc<Mutex<Option<LlmRequest>>>,
        delay: Option<Duration>,
    }

    impl MockProvider {
        fn replying(text: &str) -> Self {
            let text = text.to_string();
            Self {
                response_fn: Box::new(move || {
                    Ok(LlmResponse {
                        text: text.clone(),
                        model: "mock-v1".to_string(),
                        tokens_used: Some(42),
                        latency_ms: 10,
                    })
                }),
                call_count: Arc::new(AtomicU32::new(0)),
                last_request: Arc::new(Mutex::new(None)),
                delay: None,
            }
        }

        fn failing(status: u16, body: &str) -> Self {
            let body = body.to_string();
            Self {
                response_fn: Box::new(move || {
                    Err(ProviderError::Http {
                        provider: "mock",
                        status,
                        body: body.clone(),
                    })
                }),
                call_count: Arc::new(AtomicU32::new(0)),
                last_request: Arc::new(Mutex::new(None)),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-v1"
        }

        async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.response_fn)()
        }
    }

    const BASIC_REPLY: &str = r#"{"tags": ["linen", "white", "summer", "casual", "shirt"], "category": "shirt", "attributes": {"color": "white", "material": "linen", "sleeve": "full"}}"#;

    fn tagger(provider: MockProvider, schema: SchemaKind) -> Tagger {
        Tagger::new(Arc::new(provider), schema, Duration::from_secs(5))
    }

    fn jpeg_request() -> TaggingRequest {
        TaggingRequest::new(vec![0xFF, 0xD8, 0xFF, 0xE0], Some("image/jpeg".to_string()))
    }

    #[tokio::test]
    async fn test_tag_success() {
        let tagger = tagger(MockProvider::replying(BASIC_REPLY), SchemaKind::Basic);
        let outcome = tagger.tag(&jpeg_request()).await;

        match outcome {
            TagOutcome::Tagged {
                document, model, ..
            } => {
                assert_eq!(model, "mock-v1");
                assert_eq!(document.tags().len(), 5);
            }
            other => panic!("expected Tagged, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tag_sends_schema_prompt_and_image() {
        let provider = MockProvider::replying(BASIC_REPLY);
        let last_request = provider.last_request.clone();
        let tagger = tagger(provider, SchemaKind::Catalog);

        tagger
            .tag(&TaggingRequest::new(vec![1, 2, 3], Some("image/png".to_string())))
            .await;

        let sent = last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.prompt, SchemaKind::Catalog.prompt());
        assert_eq!(sent.image.data_url(), "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn test_tag_strips_fences() {
        let fenced = format!("```json\n{BASIC_REPLY}\n```");
        let fenced_outcome = tagger(MockProvider::replying(&fenced), SchemaKind::Basic)
            .tag(&jpeg_request())
            .await;
        let plain_outcome = tagger(MockProvider::replying(BASIC_REPLY), SchemaKind::Basic)
            .tag(&jpeg_request())
            .await;

        assert!(fenced_outcome.is_tagged());
        assert_eq!(fenced_outcome.to_body(), plain_outcome.to_body());
    }

    #[tokio::test]
    async fn test_tag_malformed_output_keeps_raw_text() {
        let truncated = r#"{"category": "shirt""#;
        let outcome = tagger(MockProvider::replying(truncated), SchemaKind::Catalog)
            .tag(&jpeg_request())
            .await;

        match outcome {
            TagOutcome::MalformedOutput { error, raw_output } => {
                assert!(matches!(error, OutputError::InvalidJson { .. }));
                assert_eq!(raw_output, truncated);
            }
            other => panic!("expected MalformedOutput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tag_raw_output_keeps_surrounding_whitespace() {
        let padded = "\n  {\"category\": \"shirt\"\n\n";
        let outcome = tagger(MockProvider::replying(padded), SchemaKind::Basic)
            .tag(&jpeg_request())
            .await;

        match outcome {
            TagOutcome::MalformedOutput { raw_output, .. } => assert_eq!(raw_output, padded),
            other => panic!("expected MalformedOutput, got {other:?}"),
        }

        let blank = tagger(MockProvider::replying(" \n "), SchemaKind::Basic)
            .tag(&jpeg_request())
            .await;
        match blank {
            TagOutcome::MalformedOutput { error, raw_output } => {
                assert!(matches!(error, OutputError::InvalidJson { .. }));
                assert_eq!(raw_output, " \n ");
            }
            other => panic!("expected MalformedOutput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tag_schema_violation_is_malformed() {
        let outcome = tagger(
            MockProvider::replying(r#"{"category": "shirt"}"#),
            SchemaKind::Basic,
        )
        .tag(&jpeg_request())
        .await;

        assert!(matches!(
            outcome,
            TagOutcome::MalformedOutput {
                error: OutputError::SchemaViolation { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_tag_upstream_error() {
        let outcome = tagger(
            MockProvider::failing(401, "invalid api key"),
            SchemaKind::Basic,
        )
        .tag(&jpeg_request())
        .await;

        match outcome {
            TagOutcome::UpstreamError(err) => assert_eq!(err.status_code(), Some(401)),
            other => panic!("expected UpstreamError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tag_times_out() {
        let provider = MockProvider::replying(BASIC_REPLY).with_delay(Duration::from_millis(500));
        let tagger = Tagger::new(
            Arc::new(provider),
            SchemaKind::Basic,
            Duration::from_millis(20),
        );

        let outcome = tagger.tag(&jpeg_request()).await;

        match outcome {
            TagOutcome::UpstreamError(err) => {
                assert!(err.is_timeout());
                assert!(err.to_string().contains("20ms"));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_upload_still_calls_provider() {
        let provider = MockProvider::failing(400, "Provided image is not valid");
        let calls = provider.call_count.clone();
        let tagger = tagger(provider, SchemaKind::Basic);

        let outcome = tagger.tag(&TaggingRequest::default()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(outcome, TagOutcome::UpstreamError(_)));
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let tagger = tagger(MockProvider::replying(BASIC_REPLY), SchemaKind::Basic);

        let first = serde_json::to_string(&tagger.tag(&jpeg_request()).await.to_body()).unwrap();
        let second = serde_json::to_string(&tagger.tag(&jpeg_request()).await.to_body()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_from_config_requires_credential() {
        let mut config = Config::default();
        config.llm.gemini = Some(crate::config::GeminiConfig {
            api_key: "${LENSTAG_TEST_UNSET_GEMINI_KEY}".to_string(),
            ..Default::default()
        });
        config.tagging.provider = crate::config::ProviderKind::Gemini;

        assert!(matches!(
            Tagger::from_config(&config),
            Err(ConfigError::MissingCredential { .. })
        ));
    }
}
