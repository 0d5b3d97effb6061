// Unified request/response types for the completion providers
//
// The healing engine only needs "send role-tagged messages, get text back",
// so these stay deliberately flat. Each provider maps them onto its own API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request handed to any `LlmProvider`
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    pub messages: Vec<Message>,

    /// Model name; empty means "use the provider's default"
    pub model: String,

    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ProviderRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: String::new(),
            max_tokens: 4096,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Concatenated system-role content, if any
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// Completion returned by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub id: String,
    pub model: String,
    /// Generated text
    pub content: String,
    pub stop_reason: Option<String>,
    /// Which provider produced this ("claude", "openai", ...)
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ProviderRequest::new(vec![Message::system("be brief"), Message::user("hi")])
            .with_model("gpt-4o")
            .with_temperature(0.3);

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.system_prompt().as_deref(), Some("be brief"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("x")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"x"}"#);
    }
}
