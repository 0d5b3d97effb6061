// Provider factory
//
// Creates LLM providers from configuration entries

use anyhow::{Context, Result};
use std::sync::Arc;

use super::claude::ClaudeProvider;
use super::openai::OpenAIProvider;
use super::LlmProvider;
use crate::config::{Config, ProviderEntry};
use crate::errors;

/// Create a provider from a configuration entry
pub fn create_provider_from_entry(entry: &ProviderEntry) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match entry {
        ProviderEntry::Claude {
            api_key,
            model,
            base_url,
            ..
        } => {
            let mut provider = ClaudeProvider::new(api_key.clone())?;
            if let Some(m) = model {
                provider = provider.with_model(m.clone());
            }
            if let Some(url) = base_url {
                provider = provider.with_base_url(url.clone());
            }
            Arc::new(provider)
        }

        ProviderEntry::Openai {
            api_key,
            model,
            base_url,
            ..
        } => {
            let mut provider = OpenAIProvider::new_openai(api_key.clone())?;
            if let Some(m) = model {
                provider = provider.with_model(m.clone());
            }
            if let Some(url) = base_url {
                provider = provider.with_base_url(url.clone());
            }
            Arc::new(provider)
        }

        ProviderEntry::Grok { api_key, model, .. } => {
            let mut provider = OpenAIProvider::new_grok(api_key.clone())?;
            if let Some(m) = model {
                provider = provider.with_model(m.clone());
            }
            Arc::new(provider)
        }

        ProviderEntry::Mistral { api_key, model, .. } => {
            let mut provider = OpenAIProvider::new_mistral(api_key.clone())?;
            if let Some(m) = model {
                provider = provider.with_model(m.clone());
            }
            Arc::new(provider)
        }

        ProviderEntry::Groq { api_key, model, .. } => {
            let mut provider = OpenAIProvider::new_groq(api_key.clone())?;
            if let Some(m) = model {
                provider = provider.with_model(m.clone());
            }
            Arc::new(provider)
        }
    };

    tracing::debug!("Created provider: {}", entry.display_name());
    Ok(provider)
}

/// Create the first configured provider
pub fn create_primary_provider(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    let entry = config
        .providers
        .first()
        .with_context(errors::no_provider_error)?;
    create_provider_from_entry(entry)
}
