// OpenAI-compatible chat completions provider
//
// Works for OpenAI, Grok (X.AI), Mistral and Groq, which all speak the same
// request format.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::with_retry;
use super::types::{ProviderRequest, ProviderResponse};
use super::LlmProvider;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    provider_name: String,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    id: String,
    model: String,
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

impl OpenAIProvider {
    pub fn new_openai(api_key: String) -> Result<Self> {
        Self::new(api_key, "https://api.openai.com", "gpt-4o", "openai")
    }

    pub fn new_grok(api_key: String) -> Result<Self> {
        Self::new(api_key, "https://api.x.ai", "grok-2", "grok")
    }

    pub fn new_mistral(api_key: String) -> Result<Self> {
        Self::new(api_key, "https://api.mistral.ai", "mistral-large-latest", "mistral")
    }

    /// Groq (by Groq Inc), not Grok (by X.AI)
    pub fn new_groq(api_key: String) -> Result<Self> {
        Self::new(api_key, "https://api.groq.com/openai", "llama-3.1-70b-versatile", "groq")
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn new(api_key: String, base_url: &str, default_model: &str, provider_name: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.to_string(),
            default_model: default_model.to_string(),
            provider_name: provider_name.to_string(),
        })
    }

    fn to_openai_request<'a>(&'a self, request: &'a ProviderRequest) -> OpenAIRequest<'a> {
        let model = if request.model.is_empty() {
            self.default_model.as_str()
        } else {
            request.model.as_str()
        };

        OpenAIRequest {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
        }
    }

    async fn send_message_once(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let body = self.to_openai_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!("Sending request to {} API: model={}", self.provider_name, body.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {} API", self.provider_name))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "{} API request failed\n\nStatus: {}\nBody: {}",
                self.provider_name,
                status,
                error_body
            );
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} API response", self.provider_name))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .context("API returned no choices in response")?;

        Ok(ProviderResponse {
            id: openai_response.id,
            model: openai_response.model,
            content: choice.message.content.unwrap_or_default(),
            stop_reason: choice.finish_reason,
            provider: self.provider_name.clone(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        with_retry(|| self.send_message_once(request)).await
    }

    fn name(&self) -> &str {
        &self.provider_name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::Message;

    #[test]
    fn test_system_message_stays_inline() {
        let provider = OpenAIProvider::new_openai("k".to_string()).unwrap();
        let request = ProviderRequest::new(vec![Message::system("sys"), Message::user("hi")]);
        let body = provider.to_openai_request(&request);

        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.model, "gpt-4o");
    }

    #[test]
    fn test_custom_model() {
        let provider = OpenAIProvider::new_grok("k".to_string())
            .unwrap()
            .with_model("grok-beta");
        assert_eq!(provider.default_model(), "grok-beta");
        assert_eq!(provider.name(), "grok");
    }

    #[tokio::test]
    async fn test_round_trip_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"chatcmpl-1","model":"gpt-4o","choices":[
                    {"index":0,"message":{"role":"assistant","content":"x = 1"},"finish_reason":"stop"}]}"#,
            )
            .create_async()
            .await;

        let provider = OpenAIProvider::new_openai("test-key".to_string())
            .unwrap()
            .with_base_url(server.url());
        let response = provider
            .send_message(&ProviderRequest::new(vec![Message::user("fix")]))
            .await
            .unwrap();

        assert_eq!(response.content, "x = 1");
        assert_eq!(response.stop_reason.as_deref(), Some("stop"));
        mock.assert_async().await;
    }
}
