// Fix proposer
// Turns validation errors into a model request and the response into code

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::extract::extract_code;
use super::prompt::{build_fix_prompt, render_template, system_prompt, PromptParts};
use crate::config::constants::DEFAULT_MAX_TOKENS;
use crate::providers::{LlmProvider, Message, ProviderRequest};

/// What the proposer is asked to fix
#[derive(Debug, Clone, Default)]
pub struct FixRequest {
    pub code: String,
    pub language: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub context: String,
    /// 1-based
    pub attempt_num: u32,
    pub custom_prompt: Option<String>,
}

/// Proposed replacement plus the exchange that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct FixProposal {
    pub code: String,
    pub prompt: String,
    /// Raw model text, or `"Error: <msg>"` when the call failed
    pub response: String,
}

pub struct FixProposer {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    timeout: Duration,
}

impl FixProposer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            temperature: 0.3,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Ask the model for a fix. Never fails: a provider error or timeout
    /// yields the input code back with the error as the response.
    pub async fn propose(&self, request: &FixRequest) -> FixProposal {
        let parts = PromptParts {
            code: &request.code,
            language: &request.language,
            errors: &request.errors,
            warnings: &request.warnings,
            context: &request.context,
            attempt_num: request.attempt_num,
        };
        let prompt = match &request.custom_prompt {
            Some(template) => render_template(template, &parts),
            None => build_fix_prompt(&parts),
        };

        let provider_request = ProviderRequest::new(vec![
            Message::system(system_prompt(&request.language)),
            Message::user(prompt.clone()),
        ])
        .with_max_tokens(DEFAULT_MAX_TOKENS)
        .with_temperature(self.temperature);

        debug!(
            provider = self.provider.name(),
            attempt = request.attempt_num,
            errors = request.errors.len(),
            "Requesting fix"
        );

        let outcome = tokio::time::timeout(
            self.timeout,
            self.provider.send_message(&provider_request),
        )
        .await;

        match outcome {
            Ok(Ok(response)) => FixProposal {
                code: extract_code(&response.content, &request.language),
                prompt,
                response: response.content,
            },
            Ok(Err(e)) => {
                warn!("Fix request failed: {}", e);
                Self::failed(request, prompt, e.to_string())
            }
            Err(_) => {
                warn!("Fix request timed out after {}s", self.timeout.as_secs());
                Self::failed(
                    request,
                    prompt,
                    format!("Request timed out after {}s", self.timeout.as_secs()),
                )
            }
        }
    }

    fn failed(request: &FixRequest, prompt: String, message: String) -> FixProposal {
        FixProposal {
            code: request.code.clone(),
            prompt,
            response: format!("Error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderResponse;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        reply: std::result::Result<String, String>,
        delay: Duration,
        seen: Mutex<Vec<ProviderRequest>>,
    }

    impl Canned {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn err(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for Canned {
        async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
            self.seen.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Ok(text) => Ok(ProviderResponse {
                    id: "resp_1".into(),
                    model: "canned".into(),
                    content: text.clone(),
                    stop_reason: Some("end_turn".into()),
                    provider: "canned".into(),
                }),
                Err(message) => bail!("{}", message),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }

        fn default_model(&self) -> &str {
            "canned"
        }
    }

    fn request() -> FixRequest {
        FixRequest {
            code: "def hello(\n    return 'world'".into(),
            language: "python".into(),
            errors: vec!["Line 1: invalid syntax - def hello(".into()],
            attempt_num: 1,
            ..FixRequest::default()
        }
    }

    #[tokio::test]
    async fn test_extracts_fenced_fix() {
        let provider = Arc::new(Canned::ok(
            "```python\ndef hello():\n    return 'world'\n```",
        ));
        let proposer = FixProposer::new(provider.clone()).with_temperature(0.1);

        let proposal = proposer.propose(&request()).await;
        assert_eq!(proposal.code, "def hello():\n    return 'world'");
        assert!(proposal.prompt.starts_with("Fix the following python code."));

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].messages.len(), 2);
        assert!(seen[0]
            .system_prompt()
            .unwrap()
            .contains("expert python developer"));
        assert_eq!(seen[0].temperature, Some(0.1));
    }

    #[tokio::test]
    async fn test_provider_error_returns_input() {
        let proposer = FixProposer::new(Arc::new(Canned::err("connection refused")));
        let proposal = proposer.propose(&request()).await;

        assert_eq!(proposal.code, request().code);
        assert_eq!(proposal.response, "Error: connection refused");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_input() {
        let mut slow = Canned::ok("def hello(): pass");
        slow.delay = Duration::from_secs(5);
        let proposer = FixProposer::new(Arc::new(slow)).with_timeout(Duration::from_secs(1));

        let proposal = proposer.propose(&request()).await;
        assert_eq!(proposal.code, request().code);
        assert!(proposal.response.starts_with("Error: "));
        assert!(proposal.response.contains("timed out"));
    }

    #[tokio::test]
    async fn test_custom_prompt_is_used() {
        let provider = Arc::new(Canned::ok("x = 1"));
        let proposer = FixProposer::new(provider);
        let mut req = request();
        req.custom_prompt = Some("Repair {language}: {errors}".into());

        let proposal = proposer.propose(&req).await;
        assert_eq!(
            proposal.prompt,
            "Repair python: - Line 1: invalid syntax - def hello("
        );
    }
}
