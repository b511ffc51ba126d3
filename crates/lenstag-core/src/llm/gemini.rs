//! Google Gemini provider using the `generateContent` REST API.
//!
//! The image travels as an `inline_data` part tagged with its MIME type,
//! next to the text prompt. The API key goes in the `key` query parameter.

use super::provider::{build_client, LlmProvider, LlmRequest, LlmResponse};
use crate::error::{ConfigError, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const PROVIDER: &str = "gemini";

/// Gemini provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: &str) -> Result<Self, ConfigError> {
        Self::with_endpoint(
            api_key,
            model,
            "https://generativelanguage.googleapis.com/v1beta",
        )
    }

    /// Create with a custom API base URL.
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: build_client(PROVIDER)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

// --- Response types ---

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
    #[serde(rename = "modelVersion")]
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct UsageMetadata {
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError> {
        let start = Instant::now();

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.media_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let resp = self
            .client
            .post(self.url())
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request {
                provider: PROVIDER,
                // reqwest includes the URL, which carries the key
                message: e.without_url().to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: PROVIDER,
                status: status.as_u16(),
                body: text,
            });
        }

        let gen_resp: GenerateResponse =
            resp.json().await.map_err(|e| ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: e.without_url().to_string(),
            })?;

        // Gemini may split one answer over several parts.
        let text = gen_resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty())
            .ok_or(ProviderError::EmptyResponse { provider: PROVIDER })?;

        Ok(LlmResponse {
            text,
            model: gen_resp.model_version.unwrap_or_else(|| self.model.clone()),
            tokens_used: gen_resp.usage_metadata.and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ImageInput;
    use crate::schema::SchemaKind;
    use httpmock::prelude::*;
    use serde_json::json;

    fn request() -> LlmRequest {
        LlmRequest::tag_image(
            ImageInput::from_bytes(&[1, 2, 3], Some("image/webp")),
            SchemaKind::Catalog,
        )
    }

    #[test]
    fn test_url_includes_model() {
        let provider =
            GeminiProvider::with_endpoint("k", "gemini-2.0-flash", "http://localhost/v1beta/")
                .unwrap();
        assert_eq!(
            provider.url(),
            "http://localhost/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_sends_inline_data() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-2.0-flash:generateContent")
                    .query_param("key", "g-test")
                    .body_contains("\"inline_data\":{\"mime_type\":\"image/webp\",\"data\":\"AQID\"}")
                    .body_contains("auto_tags");
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "```json\n{\"category\":"}, {"text": " \"bags\"}\n```"}]}
                    }],
                    "usageMetadata": {"promptTokenCount": 300, "totalTokenCount": 420},
                    "modelVersion": "gemini-2.0-flash-001"
                }));
            })
            .await;

        let provider =
            GeminiProvider::with_endpoint("g-test", "gemini-2.0-flash", &server.url("/v1beta"))
                .unwrap();
        let response = provider.generate(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.text, "```json\n{\"category\": \"bags\"}\n```");
        assert_eq!(response.model, "gemini-2.0-flash-001");
        assert_eq!(response.tokens_used, Some(420));
    }

    #[tokio::test]
    async fn test_generate_maps_rejection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(400)
                    .body("{\"error\": {\"message\": \"Unable to process input image.\"}}");
            })
            .await;

        let provider =
            GeminiProvider::with_endpoint("g-test", "gemini-2.0-flash", &server.url("/v1beta"))
                .unwrap();
        let err = provider.generate(&request()).await.unwrap_err();

        assert_eq!(err.status_code(), Some(400));
        assert!(err.to_string().contains("Unable to process input image"));
    }

    #[tokio::test]
    async fn test_generate_blocked_prompt_is_empty_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .json_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
            })
            .await;

        let provider =
            GeminiProvider::with_endpoint("g-test", "gemini-2.0-flash", &server.url("/v1beta"))
                .unwrap();
        let err = provider.generate(&request()).await.unwrap_err();

        assert!(matches!(err, ProviderError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn test_generate_returns_text_untouched() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "\n  {\"category\": \"ring\"\n\n"}]}
                    }]
                }));
            })
            .await;

        let provider =
            GeminiProvider::with_endpoint("g-test", "gemini-2.0-flash", &server.url("/v1beta"))
                .unwrap();
        let response = provider.generate(&request()).await.unwrap();

        assert_eq!(response.text, "\n  {\"category\": \"ring\"\n\n");
        assert_eq!(response.model, "gemini-2.0-flash");
    }
}
