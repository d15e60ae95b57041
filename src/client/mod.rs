//! Provider adapters and the orchestrator that drives them.

pub mod adapter;
mod orchestrator;

pub use adapter::{
    AnthropicAdapter, Capability, NO_RESPONSE, OpenAiChatAdapter, OpenAiImageAdapter,
    ProviderAdapter, ProviderConfig, ProviderError, ProviderOutcome,
};
pub use orchestrator::{PreparedRequest, RequestOrchestrator, RequestState};
