//! Gateway configuration.
//!
//! ```rust,no_run
//! use contract_assistant::config::{GatewayConfig, OrphanPolicy};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let from_env = GatewayConfig::from_env()?;
//! let explicit = GatewayConfig::builder()
//!     .orphan_policy(OrphanPolicy::Rollback)
//!     .max_output_tokens(2000)
//!     .build();
//! # let _ = (from_env, explicit);
//! # Ok(())
//! # }
//! ```

mod env;
mod settings;

pub use env::EnvConfig;
pub use settings::{
    ANTHROPIC_BASE_URL, DEFAULT_IMAGE_COUNT, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_REQUEST_TIMEOUT, GatewayConfig, GatewayConfigBuilder, OPENAI_BASE_URL, OrphanPolicy,
    ProviderEndpoints, TurnFilterPolicy,
};

use thiserror::Error;

/// Errors that can occur while reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
