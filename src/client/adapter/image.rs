//! OpenAI image generation adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::ProviderConfig;
use super::openai::{OpenAiErrorResponse, PROVIDER};
use super::outcome::{self, ProviderOutcome};
use super::traits::{Capability, ProviderAdapter};
use crate::auth::{CredentialProvider, EnvironmentProvider, ExplicitProvider};
use crate::models::ModelDescriptor;
use crate::types::{ApiMessage, GeneratedArtifact};
use crate::{Error, Result};

pub struct OpenAiImageAdapter {
    config: ProviderConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for OpenAiImageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiImageAdapter")
            .field("config", &self.config)
            .field("credentials", &self.credentials.name())
            .finish()
    }
}

impl OpenAiImageAdapter {
    pub fn new(config: ProviderConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            config,
            credentials,
        }
    }

    pub fn from_env(config: ProviderConfig) -> Self {
        Self::new(config, Arc::new(EnvironmentProvider::openai()))
    }

    pub fn with_api_key(config: ProviderConfig, key: impl Into<String>) -> Self {
        Self::new(config, Arc::new(ExplicitProvider::api_key(key)))
    }
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

#[async_trait]
impl ProviderAdapter for OpenAiImageAdapter {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn capability(&self) -> Capability {
        Capability::ImageGeneration
    }

    fn transform_request(
        &self,
        model: &ModelDescriptor,
        messages: &[ApiMessage],
    ) -> Result<serde_json::Value> {
        let prompt = messages
            .last()
            .ok_or_else(|| Error::Internal("image generation needs a prompt".into()))?;

        Ok(serde_json::to_value(ImageRequest {
            model: &model.id,
            prompt: &prompt.content,
            n: self.config.image_count,
            size: &self.config.image_size,
        })?)
    }

    fn transform_response(&self, status: u16, body: &[u8]) -> ProviderOutcome {
        outcome::decode::<ImageResponse, OpenAiErrorResponse>(PROVIDER, status, body, |r| {
            r.data
                .into_iter()
                .next()
                .and_then(|d| d.url)
                .map(GeneratedArtifact::image)
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
