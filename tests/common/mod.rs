//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use contract_assistant::client::{
    AnthropicAdapter, Capability, OpenAiChatAdapter, OpenAiImageAdapter, ProviderAdapter,
    ProviderConfig, ProviderError, ProviderOutcome,
};
use contract_assistant::config::ProviderEndpoints;
use contract_assistant::models::{CLAUDE_3_5_SONNET, DALL_E_3, GPT_4_TURBO};
use contract_assistant::reports::FileFetcher;
use contract_assistant::tokens::TokenizerKind;
use contract_assistant::types::{ApiMessage, GeneratedArtifact};
use contract_assistant::{
    ConversationGateway, GatewayConfig, ModelDescriptor, ModelRegistry, RequestOrchestrator,
    Result,
};
use serde_json::{Value, json};

pub const OPENAI_KEY: &str = "sk-openai-test";
pub const CLAUDE_KEY: &str = "sk-ant-test";
pub const SOURCE: &str = "contract Vault { function withdraw() external {} }";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Real adapters with explicit keys, pointed at `base`.
pub fn mock_registry(base: &str, gpt_limit: u64) -> ModelRegistry {
    let endpoints = ProviderEndpoints::uniform(base);
    let config = ProviderConfig::default();

    ModelRegistry::builder()
        .register(
            ModelDescriptor::new(
                GPT_4_TURBO,
                "GPT 4 Turbo",
                endpoints.openai_url("v1/chat/completions").unwrap(),
                gpt_limit,
                Arc::new(OpenAiChatAdapter::with_api_key(config.clone(), OPENAI_KEY)),
            )
            .with_tokenizer(TokenizerKind::Cl100kBase),
        )
        .register(
            ModelDescriptor::new(
                DALL_E_3,
                "DALL·E 3",
                endpoints.openai_url("v1/images/generations").unwrap(),
                76_800,
                Arc::new(OpenAiImageAdapter::with_api_key(config.clone(), OPENAI_KEY)),
            )
            .with_tokenizer(TokenizerKind::Cl100kBase),
        )
        .register(
            ModelDescriptor::new(
                CLAUDE_3_5_SONNET,
                "Claude 3.5 Sonnet",
                endpoints.anthropic_url("v1/messages").unwrap(),
                1_048_576,
                Arc::new(AnthropicAdapter::with_api_key(config, CLAUDE_KEY)),
            )
            .with_tokenizer(TokenizerKind::Cl100kBase),
        )
        .default_model(GPT_4_TURBO)
        .build()
        .unwrap()
}

pub fn gateway_with(registry: ModelRegistry, config: &GatewayConfig) -> Result<ConversationGateway> {
    let orchestrator = RequestOrchestrator::new(Arc::new(registry), config)?;
    ConversationGateway::new(
        SOURCE,
        Arc::new(orchestrator),
        Arc::new(StaticFetcher::default()),
        config,
    )
}

pub fn openai_reply(text: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    })
}

pub fn claude_reply(text: &str) -> Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    })
}

pub fn image_reply(url: &str) -> Value {
    json!({"created": 1, "data": [{"url": url}]})
}

/// Serves a fixed sample and counts fetches.
#[derive(Default)]
pub struct StaticFetcher {
    pub fetches: AtomicUsize,
}

#[async_trait]
impl FileFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(format!("# Sample report\nfetched from {url}"))
    }
}

/// Text adapter that never touches the network and counts its calls.
#[derive(Debug)]
pub struct CountingAdapter {
    config: ProviderConfig,
    calls: AtomicUsize,
}

impl CountingAdapter {
    pub fn new() -> Self {
        Self {
            config: ProviderConfig::default(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for CountingAdapter {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "counting"
    }

    fn capability(&self) -> Capability {
        Capability::TextChat
    }

    fn transform_request(
        &self,
        model: &ModelDescriptor,
        messages: &[ApiMessage],
    ) -> Result<Value> {
        Ok(json!({ "model": model.id, "messages": messages }))
    }

    fn transform_response(&self, status: u16, _body: &[u8]) -> ProviderOutcome {
        ProviderOutcome::Failure(ProviderError::no_response("counting", status))
    }

    async fn apply_auth_headers(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        Ok(req)
    }

    async fn send(
        &self,
        _http: &reqwest::Client,
        _model: &ModelDescriptor,
        _messages: &[ApiMessage],
    ) -> Result<GeneratedArtifact> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedArtifact::text("counted"))
    }
}
