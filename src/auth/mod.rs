//! Provider credentials.
//!
//! Credentials are resolved through a [`CredentialProvider`] on every provider
//! call rather than captured once at startup, so rotated keys take effect
//! without rebuilding the registry.

mod credential;
mod provider;
mod providers;

pub use credential::Credential;
pub use provider::CredentialProvider;
pub use providers::{ChainProvider, EnvironmentProvider, ExplicitProvider};

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the Anthropic API key.
pub const CLAUDE_API_KEY_VAR: &str = "CLAUDE_API_KEY";
/// Fallback environment variable for the Anthropic API key.
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
