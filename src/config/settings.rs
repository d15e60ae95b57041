//! Gateway settings and their environment overrides.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{ConfigError, ConfigResult, EnvConfig};
use crate::client::ProviderConfig;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 3000;
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const DEFAULT_IMAGE_COUNT: u32 = 1;

/// Environment variable overriding the OpenAI base URL.
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the Anthropic base URL.
pub const ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";

const ENV_PREFIX: &str = "ASSISTANT_";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";

/// What happens to the user message of a call that was cancelled or failed
/// after it was appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Leave the unanswered message in the log.
    #[default]
    Retain,
    /// Remove exactly the message the call appended.
    Rollback,
}

impl FromStr for OrphanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "retain" => Ok(Self::Retain),
            "rollback" => Ok(Self::Rollback),
            other => Err(format!("expected 'retain' or 'rollback', got '{other}'")),
        }
    }
}

/// Which providers receive the turn-paired message list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnFilterPolicy {
    /// Only providers that require strict user/assistant alternation.
    #[default]
    StrictOnly,
    /// Every text provider.
    Always,
}

impl TurnFilterPolicy {
    pub fn applies(&self, requires_alternation: bool) -> bool {
        match self {
            Self::StrictOnly => requires_alternation,
            Self::Always => true,
        }
    }
}

impl FromStr for TurnFilterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict_only" | "strict-only" => Ok(Self::StrictOnly),
            "always" => Ok(Self::Always),
            other => Err(format!("expected 'strict_only' or 'always', got '{other}'")),
        }
    }
}

/// Base URLs of the provider families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub openai: String,
    pub anthropic: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai: DEFAULT_OPENAI_URL.to_string(),
            anthropic: DEFAULT_ANTHROPIC_URL.to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Both families served from one base URL, as with a local mock server.
    pub fn uniform(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            openai: base.clone(),
            anthropic: base,
        }
    }

    pub fn from_env() -> ConfigResult<Self> {
        let env = EnvConfig::new();
        let defaults = Self::default();
        Ok(Self {
            openai: env
                .get::<Url>(OPENAI_BASE_URL)?
                .map_or(defaults.openai, String::from),
            anthropic: env
                .get::<Url>(ANTHROPIC_BASE_URL)?
                .map_or(defaults.anthropic, String::from),
        })
    }

    pub fn openai_url(&self, path: &str) -> ConfigResult<Url> {
        join(&self.openai, path, OPENAI_BASE_URL)
    }

    pub fn anthropic_url(&self, path: &str) -> ConfigResult<Url> {
        join(&self.anthropic, path, ANTHROPIC_BASE_URL)
    }
}

fn join(base: &str, path: &str, key: &str) -> ConfigResult<Url> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Settings shared by every request a gateway makes.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Blanket timeout for each outbound HTTP request.
    pub request_timeout: Duration,
    /// `max_tokens` sent with text-chat requests.
    pub max_output_tokens: u32,
    pub image_size: String,
    pub image_count: u32,
    pub orphan_policy: OrphanPolicy,
    pub turn_filter: TurnFilterPolicy,
    pub endpoints: ProviderEndpoints,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            image_count: DEFAULT_IMAGE_COUNT,
            orphan_policy: OrphanPolicy::default(),
            turn_filter: TurnFilterPolicy::default(),
            endpoints: ProviderEndpoints::default(),
        }
    }
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Defaults overridden by `ASSISTANT_*` variables and the provider base
    /// URL variables. Unset variables keep their defaults.
    pub fn from_env() -> ConfigResult<Self> {
        let env = EnvConfig::prefixed(ENV_PREFIX);
        let mut config = Self {
            endpoints: ProviderEndpoints::from_env()?,
            ..Self::default()
        };

        if let Some(secs) = env.get::<u64>("request_timeout_secs")? {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: env.env_key("request_timeout_secs"),
                    message: "timeout must be positive".into(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(tokens) = env.get::<u32>("max_output_tokens")? {
            if tokens == 0 {
                return Err(ConfigError::InvalidValue {
                    key: env.env_key("max_output_tokens"),
                    message: "must be positive".into(),
                });
            }
            config.max_output_tokens = tokens;
        }
        if let Some(size) = env.get::<String>("image_size")? {
            config.image_size = size;
        }
        if let Some(policy) = env.get::<OrphanPolicy>("orphan_policy")? {
            config.orphan_policy = policy;
        }
        if let Some(policy) = env.get::<TurnFilterPolicy>("turn_filter")? {
            config.turn_filter = policy;
        }

        tracing::debug!(
            timeout_secs = config.request_timeout.as_secs(),
            max_output_tokens = config.max_output_tokens,
            orphan_policy = ?config.orphan_policy,
            turn_filter = ?config.turn_filter,
            "loaded gateway config from environment"
        );
        Ok(config)
    }

    /// Request-shaping settings handed to provider adapters.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::default()
            .max_tokens(self.max_output_tokens)
            .image_size(self.image_size.clone())
            .image_count(self.image_count)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.max_output_tokens = tokens;
        self
    }

    pub fn image_size(mut self, size: impl Into<String>) -> Self {
        self.config.image_size = size.into();
        self
    }

    pub fn image_count(mut self, count: u32) -> Self {
        self.config.image_count = count;
        self
    }

    pub fn orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.config.orphan_policy = policy;
        self
    }

    pub fn turn_filter(mut self, policy: TurnFilterPolicy) -> Self {
        self.config.turn_filter = policy;
        self
    }

    pub fn endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    pub fn build(self) -> GatewayConfig {
        self.config
    }
}
