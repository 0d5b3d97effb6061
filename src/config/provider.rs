// Provider entries as they appear in config.toml

use serde::{Deserialize, Serialize};

/// A single model provider entry
///
/// Serializes with a `type` tag, e.g.:
/// ```toml
/// [[providers]]
/// type = "claude"
/// api_key = "sk-ant-..."
///
/// [[providers]]
/// type = "openai"
/// api_key = "sk-..."
/// model = "gpt-4o-mini"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderEntry {
    Claude {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Openai {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Grok {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Mistral {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Groq {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl ProviderEntry {
    /// Human-readable name for display.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Claude { name, .. } => name.as_deref().unwrap_or("Claude"),
            Self::Openai { name, .. } => name.as_deref().unwrap_or("OpenAI"),
            Self::Grok { name, .. } => name.as_deref().unwrap_or("Grok"),
            Self::Mistral { name, .. } => name.as_deref().unwrap_or("Mistral"),
            Self::Groq { name, .. } => name.as_deref().unwrap_or("Groq"),
        }
    }

    pub fn api_key(&self) -> &str {
        match self {
            Self::Claude { api_key, .. }
            | Self::Openai { api_key, .. }
            | Self::Grok { api_key, .. }
            | Self::Mistral { api_key, .. }
            | Self::Groq { api_key, .. } => api_key,
        }
    }

    /// Claude entry built from an environment variable
    pub fn claude_from_env(api_key: String) -> Self {
        Self::Claude {
            api_key,
            model: None,
            base_url: None,
            name: Some("Claude (Environment)".to_string()),
        }
    }

    /// OpenAI entry built from an environment variable
    pub fn openai_from_env(api_key: String) -> Self {
        Self::Openai {
            api_key,
            model: None,
            base_url: None,
            name: Some("OpenAI (Environment)".to_string()),
        }
    }
}
