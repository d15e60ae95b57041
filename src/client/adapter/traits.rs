//! Provider adapter trait definition.

use std::fmt::Debug;

use async_trait::async_trait;

use super::config::ProviderConfig;
use super::outcome::ProviderOutcome;
use crate::Result;
use crate::models::ModelDescriptor;
use crate::types::{ApiMessage, GeneratedArtifact, Modality};

/// What kind of artifact an adapter produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    TextChat,
    ImageGeneration,
}

impl Capability {
    pub fn modality(&self) -> Modality {
        match self {
            Self::TextChat => Modality::Text,
            Self::ImageGeneration => Modality::Image,
        }
    }
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync + Debug {
    fn config(&self) -> &ProviderConfig;

    fn name(&self) -> &'static str;

    fn capability(&self) -> Capability;

    /// Whether the provider rejects lists where user and assistant turns do
    /// not strictly alternate.
    fn requires_alternation(&self) -> bool {
        false
    }

    /// The part of `messages` that actually goes on the wire. Image
    /// generation only ever sees the latest message.
    fn payload(&self, mut messages: Vec<ApiMessage>) -> Vec<ApiMessage> {
        match self.capability() {
            Capability::TextChat => messages,
            Capability::ImageGeneration => messages.pop().into_iter().collect(),
        }
    }

    fn transform_request(
        &self,
        model: &ModelDescriptor,
        messages: &[ApiMessage],
    ) -> Result<serde_json::Value>;

    fn transform_response(&self, status: u16, body: &[u8]) -> ProviderOutcome;

    async fn apply_auth_headers(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder>;

    async fn send(
        &self,
        http: &reqwest::Client,
        model: &ModelDescriptor,
        messages: &[ApiMessage],
    ) -> Result<GeneratedArtifact> {
        let body = self.transform_request(model, messages)?;

        let mut req = http.post(model.endpoint.clone());
        for (k, v) in &self.config().extra_headers {
            req = req.header(k.as_str(), v.as_str());
        }
        let req = self.apply_auth_headers(req).await?.json(&body);

        let response = req.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        tracing::debug!(
            provider = self.name(),
            model = %model.id,
            status,
            bytes = bytes.len(),
            "provider responded"
        );
        self.transform_response(status, &bytes).into_result()
    }
}
