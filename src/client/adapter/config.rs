//! Request-shaping settings shared by the adapters.

use std::collections::HashMap;

use crate::config::{DEFAULT_IMAGE_COUNT, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_OUTPUT_TOKENS};

pub const DEFAULT_API_VERSION: &str = "2023-06-01";

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub max_tokens: u32,
    pub api_version: String,
    pub image_size: String,
    pub image_count: u32,
    pub extra_headers: HashMap<String, String>,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            api_version: DEFAULT_API_VERSION.into(),
            image_size: DEFAULT_IMAGE_SIZE.into(),
            image_count: DEFAULT_IMAGE_COUNT,
            extra_headers: HashMap::new(),
        }
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn image_size(mut self, size: impl Into<String>) -> Self {
        self.image_size = size.into();
        self
    }

    pub fn image_count(mut self, count: u32) -> Self {
        self.image_count = count;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new()
    }
}
