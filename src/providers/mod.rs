// Completion providers
//
// The healing engine talks to a language model through `LlmProvider` only:
// submit role-tagged messages, receive text. Claude and the OpenAI-compatible
// family are implemented here; tests plug in scripted providers.

use anyhow::Result;
use async_trait::async_trait;

pub mod claude;
pub mod factory;
pub mod openai;
pub mod retry;
pub mod types;

pub use claude::ClaudeProvider;
pub use factory::{create_primary_provider, create_provider_from_entry};
pub use openai::OpenAIProvider;
pub use types::{Message, ProviderRequest, ProviderResponse, Role};

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a request and wait for the complete response
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Provider name (e.g., "claude", "openai")
    fn name(&self) -> &str;

    /// Model used when the request leaves `model` empty
    fn default_model(&self) -> &str;
}
