//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port with its provider
//! pointed at an `httpmock::MockServer`, so tests drive `/lensTag` end to end
//! while controlling exactly what the "model" replies.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use httpmock::MockServer;
use lenstag::server::{build_app_state, create_router};
use lenstag_core::config::{GeminiConfig, OpenAiConfig};
use lenstag_core::{Config, ProviderKind};
use reqwest::{multipart, Client, Response};
use tokio::{net::TcpListener, task::JoinHandle};

/// Path the mock OpenAI endpoint is mounted on.
pub const OPENAI_PATH: &str = "/v1/chat/completions";

/// Path the mock Gemini endpoint is mounted on for the default model.
pub const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    _server_handle: JoinHandle<()>,
}

impl TestApp {
    /// Spawn with the OpenAI provider (basic schema).
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(ProviderKind::Openai, |_| {}).await
    }

    /// Spawn with the Gemini provider (catalog schema).
    pub async fn spawn_gemini() -> Result<Self> {
        Self::spawn_with(ProviderKind::Gemini, |_| {}).await
    }

    /// Spawn with `provider`, letting the caller adjust the config first.
    pub async fn spawn_with<F>(provider: ProviderKind, customize: F) -> Result<Self>
    where
        F: FnOnce(&mut Config),
    {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;

        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.tagging.provider = provider;
        config.limits.llm_timeout_ms = 5_000;
        config.llm.openai = Some(OpenAiConfig {
            api_key: "sk-test".to_string(),
            endpoint: mock_server.url(OPENAI_PATH),
            ..OpenAiConfig::default()
        });
        config.llm.gemini = Some(GeminiConfig {
            api_key: "g-test".to_string(),
            endpoint: mock_server.url("/v1beta"),
            ..GeminiConfig::default()
        });
        customize(&mut config);

        let app_state = build_app_state(config)?;
        let app = create_router(app_state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = format!("http://{}", listener.local_addr()?);

        let server_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Server error during test: {e}");
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            _server_handle: server_handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// POST `bytes` to `/lensTag` as the `file` field.
    pub async fn upload(&self, bytes: Vec<u8>, file_name: &str, mime: &str) -> Result<Response> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = multipart::Form::new().part("file", part);
        Ok(self
            .client
            .post(self.url("/lensTag"))
            .multipart(form)
            .send()
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._server_handle.abort();
    }
}

/// A few bytes that start like a JPEG. Nothing decodes them locally.
pub fn fake_jpeg() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']
}

/// OpenAI Chat Completions envelope around `content`.
pub fn openai_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 900, "completion_tokens": 80, "total_tokens": 980}
    })
}

/// Gemini generateContent envelope around `text`.
pub fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 700, "candidatesTokenCount": 120, "totalTokenCount": 820},
        "modelVersion": "gemini-2.0-flash-001"
    })
}
