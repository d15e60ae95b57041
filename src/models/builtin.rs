use std::sync::Arc;

use super::registry::ModelRegistry;
use super::spec::ModelDescriptor;
use crate::Result;
use crate::client::{AnthropicAdapter, OpenAiChatAdapter, OpenAiImageAdapter};
use crate::config::GatewayConfig;
use crate::tokens::TokenizerKind;

pub const GPT_4_TURBO: &str = "gpt-4-turbo";
pub const DALL_E_3: &str = "dall-e-3";
pub const CLAUDE_3_5_SONNET: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_MODEL: &str = GPT_4_TURBO;

pub(super) fn builtin_registry(config: &GatewayConfig) -> Result<ModelRegistry> {
    let provider_config = config.provider_config();
    let endpoints = &config.endpoints;

    let chat = Arc::new(OpenAiChatAdapter::from_env(provider_config.clone()));
    let image = Arc::new(OpenAiImageAdapter::from_env(provider_config.clone()));
    let claude = Arc::new(AnthropicAdapter::from_env(provider_config));

    ModelRegistry::builder()
        .register(
            ModelDescriptor::new(
                GPT_4_TURBO,
                "GPT 4 Turbo",
                endpoints.openai_url("v1/chat/completions")?,
                128_000,
                chat,
            )
            .with_tokenizer(TokenizerKind::Cl100kBase),
        )
        .register(
            ModelDescriptor::new(
                DALL_E_3,
                "DALL·E 3",
                endpoints.openai_url("v1/images/generations")?,
                76_800,
                image,
            )
            .with_tokenizer(TokenizerKind::Cl100kBase),
        )
        .register(
            ModelDescriptor::new(
                CLAUDE_3_5_SONNET,
                "Claude 3.5 Sonnet",
                endpoints.anthropic_url("v1/messages")?,
                1_048_576,
                claude,
            )
            .with_tokenizer(TokenizerKind::Cl100kBase),
        )
        .default_model(DEFAULT_MODEL)
        .build()
}
