use std::collections::HashMap;

use super::builtin;
use super::spec::ModelDescriptor;
use crate::config::GatewayConfig;
use crate::types::Modality;
use crate::{Error, Result};

/// Read-only table of models, built once and shared across requests.
#[derive(Debug)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    index: HashMap<String, usize>,
    default: usize,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// The built-in OpenAI and Anthropic models, with base URLs and output
    /// settings taken from `config`.
    pub fn builtins(config: &GatewayConfig) -> Result<Self> {
        builtin::builtin_registry(config)
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.index.get(id).map(|&i| &self.models[i])
    }

    pub fn lookup(&self, id: &str) -> Result<&ModelDescriptor> {
        self.get(id).ok_or_else(|| Error::UnknownModel { id: id.to_string() })
    }

    /// Like [`lookup`](Self::lookup), but an empty id selects the default model.
    pub fn resolve(&self, id: &str) -> Result<&ModelDescriptor> {
        if id.trim().is_empty() {
            return Ok(self.default());
        }
        self.lookup(id)
    }

    pub fn default(&self) -> &ModelDescriptor {
        &self.models[self.default]
    }

    /// Models of `modality`, in registration order.
    pub fn all_of_modality(&self, modality: Modality) -> Vec<&ModelDescriptor> {
        self.models
            .iter()
            .filter(|m| m.modality == modality)
            .collect()
    }

    pub fn text_models(&self) -> Vec<&ModelDescriptor> {
        self.all_of_modality(Modality::Text)
    }

    pub fn image_model(&self) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.modality == Modality::Image)
    }

    pub fn all(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ModelRegistryBuilder {
    models: Vec<ModelDescriptor>,
    default: Option<String>,
}

impl ModelRegistryBuilder {
    /// Registers `descriptor`, replacing any earlier model with the same id.
    pub fn register(mut self, descriptor: ModelDescriptor) -> Self {
        self.models.retain(|m| m.id != descriptor.id);
        self.models.push(descriptor);
        self
    }

    pub fn default_model(mut self, id: impl Into<String>) -> Self {
        self.default = Some(id.into());
        self
    }

    /// Without an explicit default, the first registered model is used.
    pub fn build(self) -> Result<ModelRegistry> {
        let Some(first) = self.models.first() else {
            return Err(Error::Config("model registry is empty".into()));
        };
        let default_id = self.default.unwrap_or_else(|| first.id.clone());

        let index: HashMap<String, usize> = self
            .models
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();

        let default = *index.get(&default_id).ok_or_else(|| {
            Error::Config(format!("default model '{default_id}' is not registered"))
        })?;

        tracing::debug!(
            models = self.models.len(),
            default = %default_id,
            "model registry built"
        );

        Ok(ModelRegistry {
            models: self.models,
            index,
            default,
        })
    }
}
