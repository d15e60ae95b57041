//! Anthropic Messages API adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::ProviderConfig;
use super::outcome::{self, ErrorEnvelope, ProviderError, ProviderOutcome};
use super::traits::{Capability, ProviderAdapter};
use crate::Result;
use crate::auth::{
    ANTHROPIC_API_KEY_VAR, ChainProvider, CredentialProvider, EnvironmentProvider,
    ExplicitProvider,
};
use crate::models::ModelDescriptor;
use crate::types::{ApiMessage, GeneratedArtifact, Role};

const PROVIDER: &str = "anthropic";

/// Requires strict user/assistant alternation; system turns are lifted into
/// the top-level `system` field.
pub struct AnthropicAdapter {
    config: ProviderConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for AnthropicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicAdapter")
            .field("config", &self.config)
            .field("credentials", &self.credentials.name())
            .finish()
    }
}

impl AnthropicAdapter {
    pub fn new(config: ProviderConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            config,
            credentials,
        }
    }

    /// Reads `CLAUDE_API_KEY`, then `ANTHROPIC_API_KEY`, on every call.
    pub fn from_env(config: ProviderConfig) -> Self {
        let chain = ChainProvider::new(vec![])
            .with(EnvironmentProvider::claude())
            .with(EnvironmentProvider::from_var(ANTHROPIC_API_KEY_VAR));
        Self::new(config, Arc::new(chain))
    }

    pub fn with_api_key(config: ProviderConfig, key: impl Into<String>) -> Self {
        Self::new(config, Arc::new(ExplicitProvider::api_key(key)))
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<&'a ApiMessage>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}

/// `{"type": "error", "error": {"type", "message"}}`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    message: String,
}

impl ErrorEnvelope for ErrorResponse {
    fn into_provider_error(self, provider: &'static str, status: u16) -> ProviderError {
        ProviderError::new(provider, status, self.error.message).with_type(self.error.error_type)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn capability(&self) -> Capability {
        Capability::TextChat
    }

    fn requires_alternation(&self) -> bool {
        true
    }

    fn transform_request(
        &self,
        model: &ModelDescriptor,
        messages: &[ApiMessage],
    ) -> Result<serde_json::Value> {
        let (system, turns): (Vec<&ApiMessage>, Vec<&ApiMessage>) =
            messages.iter().partition(|m| m.role == Role::System);

        let system = (!system.is_empty()).then(|| {
            system
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        });

        Ok(serde_json::to_value(MessagesRequest {
            model: &model.id,
            max_tokens: self.config.max_tokens,
            system,
            messages: turns,
        })?)
    }

    fn transform_response(&self, status: u16, body: &[u8]) -> ProviderOutcome {
        outcome::decode::<MessagesResponse, ErrorResponse>(PROVIDER, status, body, |r| {
            r.content
                .into_iter()
                .next()
                .and_then(|block| block.text)
                .map(GeneratedArtifact::text)
        })
    }

    async fn apply_auth_headers(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        let credential = self.credentials.resolve().await?;
        Ok(req
            .header("x-api-key", credential.expose())
            .header("anthropic-version", &self.config.api_version))
    }
}
