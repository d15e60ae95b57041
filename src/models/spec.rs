use std::sync::Arc;

use url::Url;

use crate::client::ProviderAdapter;
use crate::tokens::TokenizerKind;
use crate::types::Modality;

/// Immutable description of one model and the adapter that speaks to it.
///
/// The adapter is bound when the descriptor is built, so dispatch never
/// depends on the id string.
#[derive(Clone)]
pub struct ModelDescriptor {
    pub id: String,
    pub display_name: String,
    pub modality: Modality,
    pub endpoint: Url,
    pub max_context_tokens: u64,
    pub tokenizer: TokenizerKind,
    adapter: Arc<dyn ProviderAdapter>,
}

impl std::fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("modality", &self.modality)
            .field("endpoint", &self.endpoint.as_str())
            .field("max_context_tokens", &self.max_context_tokens)
            .field("tokenizer", &self.tokenizer)
            .field("adapter", &self.adapter.name())
            .finish()
    }
}

impl ModelDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        endpoint: Url,
        max_context_tokens: u64,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            modality: adapter.capability().modality(),
            endpoint,
            max_context_tokens,
            tokenizer: TokenizerKind::default(),
            adapter,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerKind) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn adapter(&self) -> &Arc<dyn ProviderAdapter> {
        &self.adapter
    }

    pub fn requires_alternation(&self) -> bool {
        self.adapter.requires_alternation()
    }

    pub fn is_image(&self) -> bool {
        self.modality == Modality::Image
    }
}
