// Scripted collaborators shared by the integration tests

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mender::providers::{LlmProvider, ProviderRequest, ProviderResponse, Role};
use mender::validation::{Validate, ValidationOutcome, ValidationStrategy};

type Reply = Box<dyn Fn(usize, &str) -> std::result::Result<String, String> + Send + Sync>;

/// Provider whose reply is computed from the call index and the user prompt
pub struct ScriptedProvider {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(
        reply: impl Fn(usize, &str) -> std::result::Result<String, String> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Always answers with `text`
    pub fn constant(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// Fails every call with `message`
    pub fn failing(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::new(move |_, _| Err(message.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request
            .messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt.clone());

        match (self.reply)(index, &prompt) {
            Ok(content) => Ok(ProviderResponse {
                id: format!("scripted_{}", index),
                model: "scripted".to_string(),
                content,
                stop_reason: Some("end_turn".to_string()),
                provider: "scripted".to_string(),
            }),
            Err(message) => bail!("{}", message),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted"
    }
}

/// Marker words and the strategy that reports them
pub const MARKERS: &[(&str, ValidationStrategy)] = &[
    ("SYNTAX_BUG", ValidationStrategy::Syntax),
    ("TYPE_BUG", ValidationStrategy::TypeCheck),
    ("LINT_BUG", ValidationStrategy::Lint),
];

/// Validator whose verdict depends only on marker words in the code
#[derive(Default)]
pub struct MarkerValidator {
    calls: AtomicUsize,
}

impl MarkerValidator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn error_for(marker: &str) -> String {
        format!("found {}", marker)
    }
}

#[async_trait]
impl Validate for MarkerValidator {
    async fn validate(
        &self,
        code: &str,
        _language: &str,
        strategies: &[ValidationStrategy],
        _file_path: Option<&Path>,
    ) -> Vec<ValidationOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        strategies
            .iter()
            .map(|&strategy| {
                let errors = MARKERS
                    .iter()
                    .filter(|(marker, owner)| *owner == strategy && code.contains(marker))
                    .map(|(marker, _)| Self::error_for(marker))
                    .collect();
                ValidationOutcome::from_diagnostics(strategy, errors, Vec::new(), Duration::ZERO)
            })
            .collect()
    }
}

/// Wrap code in a fenced block the way models usually answer
pub fn fenced(language: &str, code: &str) -> String {
    format!("Here is the fix:\n\n```{}\n{}\n```\n", language, code)
}
