//! Environment variable credential provider.

use async_trait::async_trait;

use crate::auth::{Credential, CredentialProvider};
use crate::{Error, Result};

/// Reads an API key from an environment variable each time it is resolved.
pub struct EnvironmentProvider {
    env_var: String,
}

impl EnvironmentProvider {
    pub fn from_var(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }

    pub fn openai() -> Self {
        Self::from_var(crate::auth::OPENAI_API_KEY_VAR)
    }

    pub fn claude() -> Self {
        Self::from_var(crate::auth::CLAUDE_API_KEY_VAR)
    }

    pub fn env_var(&self) -> &str {
        &self.env_var
    }
}

#[async_trait]
impl CredentialProvider for EnvironmentProvider {
    fn name(&self) -> &str {
        "environment"
    }

    async fn resolve(&self) -> Result<Credential> {
        match std::env::var(&self.env_var) {
            Ok(value) if !value.trim().is_empty() => Ok(Credential::api_key(value)),
            _ => Err(Error::auth(format!("{} not set", self.env_var))),
        }
    }
}
