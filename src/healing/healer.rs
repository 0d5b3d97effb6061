// Healing controller
//
// Drives the validate -> propose -> revalidate loop for one piece of code.
// Attempt records are assembled only after the run's outcome is known.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::backup::BackupLedger;
use super::config::HealingConfig;
use super::language::detect_language;
use super::proposer::{FixProposer, FixRequest};
use super::stats::HealingStats;
use super::types::{HealingAttempt, HealingResult};
use crate::config::app_dir;
use crate::errors::HealError;
use crate::providers::LlmProvider;
use crate::validation::{CodeValidator, Validate, ValidationOutcome};

/// Appended to the running context when the proposer returns its input unchanged
pub const STAGNATION_NOTE: &str =
    "\n\nPREVIOUS ATTEMPT RETURNED SAME CODE. Try a different approach.";

/// One heal invocation
#[derive(Debug, Clone, Default)]
pub struct HealRequest {
    pub code: String,
    pub language: String,
    pub context: String,
    /// Enables the pre-heal backup and path-aware checks
    pub file_path: Option<PathBuf>,
    /// Template overriding the built-in fix prompt
    pub custom_prompt: Option<String>,
}

impl HealRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_custom_prompt(mut self, template: impl Into<String>) -> Self {
        self.custom_prompt = Some(template.into());
        self
    }
}

/// Attempt data gathered during the loop, before success is known
struct AttemptDraft {
    attempt_number: u32,
    original_code: String,
    fixed_code: String,
    validation_results: Vec<ValidationOutcome>,
    ai_prompt: String,
    ai_response: String,
    timestamp: DateTime<Local>,
}

impl AttemptDraft {
    fn finalize(self, success: bool) -> HealingAttempt {
        HealingAttempt {
            attempt_number: self.attempt_number,
            original_code: self.original_code,
            fixed_code: self.fixed_code,
            validation_results: self.validation_results,
            ai_prompt: self.ai_prompt,
            ai_response: self.ai_response,
            timestamp: self.timestamp,
            success,
        }
    }
}

pub struct AutoHealer {
    validator: Arc<dyn Validate>,
    proposer: FixProposer,
    config: HealingConfig,
    ledger: BackupLedger,
    history: Vec<HealingResult>,
}

impl AutoHealer {
    /// Healer with the built-in checks and backups under `~/.mender/backups`
    pub fn new(provider: Arc<dyn LlmProvider>, config: HealingConfig) -> Self {
        let proposer = FixProposer::new(provider)
            .with_temperature(config.temperature)
            .with_timeout(config.ai_timeout());
        Self {
            validator: Arc::new(CodeValidator::default()),
            proposer,
            config,
            ledger: BackupLedger::new(app_dir().join("backups")),
            history: Vec::new(),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validate>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ledger = BackupLedger::new(dir);
        self
    }

    pub fn config(&self) -> &HealingConfig {
        &self.config
    }

    pub fn ledger(&self) -> &BackupLedger {
        &self.ledger
    }

    /// Completed runs, oldest first. Already-valid inputs are not recorded.
    pub fn history(&self) -> &[HealingResult] {
        &self.history
    }

    pub fn stats(&self) -> HealingStats {
        HealingStats::from_history(&self.history)
    }

    /// Repair `request.code` until every configured strategy passes or the
    /// attempt budget runs out
    ///
    /// Only a failed backup write is an error; model and checker failures are
    /// recorded on the result.
    #[instrument(skip(self, request), fields(language = %request.language))]
    pub async fn heal_code(&mut self, request: HealRequest) -> Result<HealingResult, HealError> {
        let start = Instant::now();
        let file_path = request.file_path.as_deref();
        let strategies = self.config.strategies.clone();

        if self.config.save_before_healing {
            if let Some(path) = file_path {
                self.ledger.snapshot(path, &request.code)?;
            }
        }

        let initial = self
            .validator
            .validate(&request.code, &request.language, &strategies, file_path)
            .await;
        let original_errors = collect_errors(&initial);

        if all_valid(&initial) {
            debug!("Code already valid, nothing to heal");
            return Ok(HealingResult {
                success: true,
                original_code: request.code.clone(),
                final_code: request.code,
                attempts: Vec::new(),
                total_time: start.elapsed(),
                errors_fixed: Vec::new(),
                errors_remaining: Vec::new(),
            });
        }

        info!(
            "Healing {} code: {} errors, up to {} attempts",
            request.language,
            original_errors.len(),
            self.config.max_attempts
        );

        let mut drafts: Vec<AttemptDraft> = Vec::new();
        let mut current_code = request.code.clone();
        let mut context = if self.config.include_context {
            request.context.clone()
        } else {
            String::new()
        };

        for attempt_num in 1..=self.config.max_attempts {
            let outcomes = self
                .validator
                .validate(&current_code, &request.language, &strategies, file_path)
                .await;

            if all_valid(&outcomes) {
                let remaining = collect_errors(&outcomes);
                let result = self.finish(
                    &request,
                    current_code,
                    drafts,
                    true,
                    &original_errors,
                    remaining,
                    start,
                );
                return Ok(result);
            }

            let fix_request = FixRequest {
                code: current_code.clone(),
                language: request.language.clone(),
                errors: collect_errors(&outcomes),
                warnings: collect_warnings(&outcomes),
                context: context.clone(),
                attempt_num,
                custom_prompt: request.custom_prompt.clone(),
            };
            debug!(
                attempt = attempt_num,
                errors = fix_request.errors.len(),
                "Proposing fix"
            );
            let proposal = self.proposer.propose(&fix_request).await;

            let stagnant = proposal.code == current_code;
            drafts.push(AttemptDraft {
                attempt_number: attempt_num,
                original_code: current_code,
                fixed_code: proposal.code.clone(),
                validation_results: outcomes,
                ai_prompt: proposal.prompt,
                ai_response: proposal.response,
                timestamp: Local::now(),
            });

            if stagnant {
                debug!(attempt = attempt_num, "Proposer returned unchanged code");
                if self.config.include_context && attempt_num < self.config.max_attempts {
                    context.push_str(STAGNATION_NOTE);
                }
            }

            current_code = proposal.code;
        }

        let final_outcomes = self
            .validator
            .validate(&current_code, &request.language, &strategies, file_path)
            .await;
        let remaining = collect_errors(&final_outcomes);

        // Any reduction in error count counts as success when partial success is allowed
        let success = all_valid(&final_outcomes)
            || (self.config.retry_on_partial_success && remaining.len() < original_errors.len());

        Ok(self.finish(
            &request,
            current_code,
            drafts,
            success,
            &original_errors,
            remaining,
            start,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &mut self,
        request: &HealRequest,
        final_code: String,
        drafts: Vec<AttemptDraft>,
        success: bool,
        original_errors: &[String],
        remaining: Vec<String>,
        start: Instant,
    ) -> HealingResult {
        let last = drafts.len();
        let attempts = drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| draft.finalize(success && i + 1 == last))
            .collect();

        let errors_fixed = original_errors
            .iter()
            .filter(|e| !remaining.contains(e))
            .cloned()
            .collect();

        let result = HealingResult {
            success,
            original_code: request.code.clone(),
            final_code,
            attempts,
            total_time: start.elapsed(),
            errors_fixed,
            errors_remaining: remaining,
        };

        if result.success {
            info!("{}", result);
        } else {
            warn!("{}", result);
        }

        self.history.push(result.clone());
        result
    }

    /// Heal a file on disk, writing the result back only when asked and
    /// successful
    #[instrument(skip(self, context))]
    pub async fn heal_file(
        &mut self,
        path: &Path,
        context: &str,
        save_result: bool,
    ) -> Result<HealingResult, HealError> {
        if !path.exists() {
            return Err(HealError::FileNotFound(path.to_path_buf()));
        }

        let code = fs::read_to_string(path).map_err(|e| HealError::io(path, e))?;
        let language = detect_language(path);

        let request = HealRequest::new(code, language)
            .with_context(context)
            .with_file_path(path);
        let result = self.heal_code(request).await?;

        if save_result && result.success {
            fs::write(path, &result.final_code).map_err(|e| HealError::io(path, e))?;
            info!("Saved healed code to {}", path.display());
        }

        Ok(result)
    }
}

fn all_valid(outcomes: &[ValidationOutcome]) -> bool {
    outcomes.iter().all(|o| o.is_valid)
}

fn collect_errors(outcomes: &[ValidationOutcome]) -> Vec<String> {
    outcomes.iter().flat_map(|o| o.errors.iter().cloned()).collect()
}

fn collect_warnings(outcomes: &[ValidationOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .flat_map(|o| o.warnings.iter().cloned())
        .collect()
}
