//! Environment variable configuration reader.

use std::fmt::Display;
use std::str::FromStr;

use super::{ConfigError, ConfigResult};

/// Read-only environment variable reader.
///
/// Environment variables are treated as immutable at runtime because
/// modifying them is not thread-safe.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    prefix: Option<String>,
}

impl EnvConfig {
    /// Create a reader with no prefix
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Create a reader with a prefix
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Get the full environment variable name
    pub fn env_key(&self, key: &str) -> String {
        let key = key.to_uppercase().replace('.', "_");
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, key),
            None => key,
        }
    }

    /// Raw value, `None` when unset.
    pub fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        match std::env::var(self.env_key(key)) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }

    /// Parsed value, `None` when unset or blank.
    pub fn get<T>(&self, key: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        raw.parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: self.env_key(key),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_conversion() {
        let env = EnvConfig::new();
        assert_eq!(env.env_key("image.size"), "IMAGE_SIZE");

        let env = EnvConfig::prefixed("ASSISTANT_");
        assert_eq!(env.env_key("max_output_tokens"), "ASSISTANT_MAX_OUTPUT_TOKENS");
    }

    #[test]
    fn test_env_get_parsed() {
        let env = EnvConfig::prefixed("CA_TEST_ENV_GET_");

        // SAFETY: Test-only environment setup, prefix unique to this test
        unsafe {
            std::env::set_var("CA_TEST_ENV_GET_NUMBER", " 42 ");
            std::env::set_var("CA_TEST_ENV_GET_BAD", "forty-two");
            std::env::set_var("CA_TEST_ENV_GET_BLANK", "  ");
        }

        assert_eq!(env.get::<u32>("number").unwrap(), Some(42));
        assert_eq!(env.get::<u32>("blank").unwrap(), None);
        assert_eq!(env.get::<u32>("unset").unwrap(), None);

        let err = env.get::<u32>("bad").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "CA_TEST_ENV_GET_BAD"));

        unsafe {
            std::env::remove_var("CA_TEST_ENV_GET_NUMBER");
            std::env::remove_var("CA_TEST_ENV_GET_BAD");
            std::env::remove_var("CA_TEST_ENV_GET_BLANK");
        }
    }
}
