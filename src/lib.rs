//! # contract-assistant
//!
//! Conversation gateway for smart-contract review assistants.
//!
//! A [`ConversationGateway`] keeps one session's running conversation about a
//! codebase and sends prompts to chat, image, and strict-alternation models.
//! Every request is checked against the target model's context budget before
//! it leaves the process, and any request can be cancelled mid-flight.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contract_assistant::{ConversationGateway, GatewayConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), contract_assistant::Error> {
//!     let config = GatewayConfig::from_env()?;
//!     let gateway = ConversationGateway::from_config("contract Vault { }", &config)?;
//!
//!     let cancel = CancellationToken::new();
//!     let visible = gateway
//!         .prompt_model("Who can withdraw from the vault?", "gpt-4-turbo", &cancel)
//!         .await?;
//!     for message in visible {
//!         println!("{}: {}", message.role.as_str(), message.content);
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod client;
pub mod config;
pub mod conversation;
pub mod gateway;
pub mod models;
pub mod reports;
pub mod tokens;
pub mod types;

pub use client::{
    Capability, PreparedRequest, ProviderAdapter, ProviderOutcome, RequestOrchestrator,
    RequestState,
};
pub use config::{GatewayConfig, OrphanPolicy, TurnFilterPolicy};
pub use conversation::ConversationStore;
pub use gateway::ConversationGateway;
pub use models::{ModelDescriptor, ModelRegistry};
pub use reports::ReportKind;
pub use tokens::{PreflightResult, TokenEstimator};
pub use types::{GeneratedArtifact, Message, MessageId, Modality, Role};

/// Error type for gateway operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No model is registered under this id.
    #[error("Unknown model: {id}")]
    UnknownModel { id: String },

    /// The payload would not fit the model's context window.
    #[error("Context budget exceeded for {model}: {estimated} tokens > {limit} limit")]
    BudgetExceeded {
        model: String,
        estimated: u64,
        limit: u64,
    },

    /// The provider answered with an error.
    #[error("{provider} error (HTTP {status}): {message}")]
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
        error_type: Option<String>,
    },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller cancelled the request before it settled.
    #[error("Request cancelled")]
    Cancelled,

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication failed.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tokenizer could not be loaded.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Unknown report type: {0}")]
    UnknownReport(String),

    /// A report sample could not be fetched.
    #[error("Unable to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Internal error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input from the caller (unknown model or report type)
    Caller,
    /// The request does not fit the model's context window
    ResourceLimit,
    /// The provider rejected the request
    Provider,
    /// Network, rate limit, or server errors that may succeed later
    Transient,
    /// Cancelled by the caller
    Cancelled,
    /// Credentials, settings, or tokenizer setup
    Configuration,
    /// Internal errors (JSON, unexpected states)
    Internal,
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownModel { .. } | Error::UnknownReport(_) => ErrorCategory::Caller,

            Error::BudgetExceeded { .. } => ErrorCategory::ResourceLimit,

            Error::Provider {
                status: 429 | 500..=599,
                ..
            }
            | Error::Transport(_)
            | Error::Fetch { .. } => ErrorCategory::Transient,
            Error::Provider { .. } => ErrorCategory::Provider,

            Error::Cancelled => ErrorCategory::Cancelled,

            Error::Auth { .. } | Error::Config(_) | Error::Tokenizer(_) => {
                ErrorCategory::Configuration
            }

            Error::Json(_) | Error::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Rejected before any network call or conversation change.
    pub fn is_pre_flight(&self) -> bool {
        matches!(self, Error::UnknownModel { .. } | Error::BudgetExceeded { .. })
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Provider { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Env(e) => Error::Config(e.to_string()),
        }
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
