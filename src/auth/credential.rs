//! Credential types.

use secrecy::{ExposeSecret, SecretString};

/// Authentication credential.
#[derive(Clone, Debug)]
pub enum Credential {
    /// API key sent as a bearer token or provider-specific key header.
    ApiKey(SecretString),
}

impl Credential {
    /// Create API Key credential.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(SecretString::from(key.into()))
    }

    pub fn credential_type(&self) -> &'static str {
        match self {
            Credential::ApiKey(_) => "api_key",
        }
    }

    /// Raw secret, for placing into a request header.
    pub fn expose(&self) -> &str {
        match self {
            Credential::ApiKey(key) => key.expose_secret(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expose().trim().is_empty()
    }
}
