//! Provider adapters: one per wire format.

mod anthropic;
mod config;
mod image;
mod openai;
mod outcome;
mod traits;

pub use anthropic::AnthropicAdapter;
pub use config::{DEFAULT_API_VERSION, ProviderConfig};
pub use image::OpenAiImageAdapter;
pub use openai::OpenAiChatAdapter;
pub use outcome::{NO_RESPONSE, ProviderError, ProviderOutcome};
pub use traits::{Capability, ProviderAdapter};
