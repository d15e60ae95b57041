//! OpenAI chat completions adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::ProviderConfig;
use super::outcome::{self, ErrorEnvelope, ProviderError, ProviderOutcome};
use super::traits::{Capability, ProviderAdapter};
use crate::Result;
use crate::auth::{CredentialProvider, EnvironmentProvider, ExplicitProvider};
use crate::models::ModelDescriptor;
use crate::types::{ApiMessage, GeneratedArtifact};

pub(crate) const PROVIDER: &str = "openai";

pub struct OpenAiChatAdapter {
    config: ProviderConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for OpenAiChatAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatAdapter")
            .field("config", &self.config)
            .field("credentials", &self.credentials.name())
            .finish()
    }
}

impl OpenAiChatAdapter {
    pub fn new(config: ProviderConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            config,
            credentials,
        }
    }

    /// Reads `OPENAI_API_KEY` on every call.
    pub fn from_env(config: ProviderConfig) -> Self {
        Self::new(config, Arc::new(EnvironmentProvider::openai()))
    }

    pub fn with_api_key(config: ProviderConfig, key: impl Into<String>) -> Self {
        Self::new(config, Arc::new(ExplicitProvider::api_key(key)))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ApiMessage],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `{"error": {"message", "type", "param", "code"}}`, shared by every
/// OpenAI endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

impl ErrorEnvelope for OpenAiErrorResponse {
    fn into_provider_error(self, provider: &'static str, status: u16) -> ProviderError {
        ProviderError::new(provider, status, self.error.message).with_type(self.error.error_type)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiChatAdapter {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn capability(&self) -> Capability {
        Capability::TextChat
    }

    fn transform_request(
        &self,
        model: &ModelDescriptor,
        messages: &[ApiMessage],
    ) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(ChatRequest {
            model: &model.id,
            messages,
            max_tokens: self.config.max_tokens,
        })?)
    }

    fn transform_response(&self, status: u16, body: &[u8]) -> ProviderOutcome {
        outcome::decode::<ChatCompletion, OpenAiErrorResponse>(PROVIDER, status, body, |c| {
            c.choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .map(GeneratedArtifact::text)
        })
    }

    async fn apply_auth_headers(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        let credential = self.credentials.resolve().await?;
        Ok(req.bearer_auth(credential.expose()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::model_with_adapter;
    use crate::types::Role;

    fn adapter() -> OpenAiChatAdapter {
        OpenAiChatAdapter::with_api_key(ProviderConfig::default(), "sk-test")
    }

    #[test]
    fn test_transform_request_shape() {
        let adapter = Arc::new(adapter());
        let model = model_with_adapter("gpt-4-turbo", 128_000, adapter.clone());
        let body = adapter
            .transform_request(
                &model,
                &[
                    ApiMessage::new(Role::User, "hi"),
                    ApiMessage::new(Role::Assistant, "hello"),
                ],
            )
            .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-4-turbo",
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ],
                "max_tokens": 3000
            })
        );
    }

    #[test]
    fn test_first_choice_wins() {
        let body = br#"{"choices": [
            {"message": {"role": "assistant", "content": "first"}},
            {"message": {"role": "assistant", "content": "second"}}
        ]}"#;
        assert_eq!(
            adapter().transform_response(200, body),
            ProviderOutcome::Success(GeneratedArtifact::text("first"))
        );
    }

    #[test]
    fn test_error_envelope() {
        let body = br#"{"error": {"message": "Rate limit reached", "type": "requests", "param": null, "code": "rate_limit_exceeded"}}"#;
        match adapter().transform_response(429, body) {
            ProviderOutcome::Failure(e) => {
                assert_eq!(e.provider, "openai");
                assert_eq!(e.message, "Rate limit reached");
                assert_eq!(e.error_type.as_deref(), Some("requests"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_empty_choices_is_no_response() {
        match adapter().transform_response(200, br#"{"choices": []}"#) {
            ProviderOutcome::Failure(e) => assert_eq!(e.message, outcome::NO_RESPONSE),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
