// Command handlers

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;

use super::args::{BackupAction, Commands, Preset};
use crate::config::Config;
use crate::errors::HealError;
use crate::healing::{detect_language, AutoHealer, BackupLedger, HealingResult};
use crate::metrics::{HealingLogger, HealingRecord, HealingSummary};
use crate::providers::create_primary_provider;
use crate::validation::{
    CodeValidator, Validate, ValidationOutcome, ValidationStrategy, ValidationSummary,
};

/// Options for `mender heal`
#[derive(Debug, Clone)]
pub struct HealOptions {
    pub file: PathBuf,
    pub preset: Option<Preset>,
    pub max_attempts: Option<u32>,
    pub strategies: Vec<ValidationStrategy>,
    pub context: Option<String>,
    pub save: bool,
    pub yes: bool,
    pub no_backup: bool,
    pub json: bool,
}

pub async fn run_command(command: Commands, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Heal {
            file,
            preset,
            max_attempts,
            strategies,
            context,
            save,
            yes,
            no_backup,
            json,
        } => {
            let options = HealOptions {
                file,
                preset,
                max_attempts,
                strategies,
                context,
                save,
                yes,
                no_backup,
                json,
            };
            heal(config, options).await
        }
        Commands::Validate { file, strategies } => validate(config, &file, strategies).await,
        Commands::Backups { action } => backups(config, action),
        Commands::Stats { date } => stats(config, date),
    }
}

async fn heal(config: &Config, options: HealOptions) -> Result<ExitCode> {
    let provider = create_primary_provider(config)?;

    let mut healing = options
        .preset
        .map(Preset::healing_config)
        .unwrap_or_else(|| config.healing.clone());
    if let Some(max_attempts) = options.max_attempts {
        if max_attempts == 0 {
            bail!("--max-attempts must be at least 1");
        }
        healing.max_attempts = max_attempts;
    }
    if !options.strategies.is_empty() {
        healing.strategies = options.strategies.clone();
    }
    if options.no_backup {
        healing.save_before_healing = false;
    }
    let require_confirmation = healing.require_user_confirmation;

    let validator = Arc::new(CodeValidator::new(config.validator_settings()));
    let mut healer = AutoHealer::new(provider, healing)
        .with_validator(validator)
        .with_backup_dir(config.backup_dir.clone());

    let context = options.context.as_deref().unwrap_or("");
    let result = healer.heal_file(&options.file, context, false).await?;

    log_run(config, &options.file, &result);

    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    } else {
        println!("{}", format_heal_report(&result));
    }

    if options.save && result.success && result.changed() {
        let approved = options.yes
            || !require_confirmation
            || confirm(&format!("Write fixed code to {}?", options.file.display()))?;
        if approved {
            fs::write(&options.file, &result.final_code)
                .map_err(|e| HealError::io(&options.file, e))?;
            eprintln!("✓ Saved {}", options.file.display());
        } else {
            eprintln!("Not saved");
        }
    }

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Metrics are best-effort; a logging failure never fails the heal
fn log_run(config: &Config, file: &Path, result: &HealingResult) {
    let record = HealingRecord::from_result(
        result,
        HealingLogger::hash_code(&result.original_code),
        detect_language(file),
        Some(file),
    );
    match HealingLogger::new(config.metrics_dir.clone()) {
        Ok(logger) => {
            if let Err(e) = logger.log(&record) {
                warn!("Failed to record healing run: {}", e);
            }
        }
        Err(e) => warn!("Failed to open healing log: {}", e),
    }
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn validate(
    config: &Config,
    file: &Path,
    strategies: Vec<ValidationStrategy>,
) -> Result<ExitCode> {
    if !file.exists() {
        return Err(HealError::FileNotFound(file.to_path_buf()).into());
    }
    let code = fs::read_to_string(file).map_err(|e| HealError::io(file, e))?;
    let language = detect_language(file);
    let strategies = if strategies.is_empty() {
        config.healing.strategies.clone()
    } else {
        strategies
    };

    let validator = CodeValidator::new(config.validator_settings());
    let outcomes = validator
        .validate(&code, language, &strategies, Some(file))
        .await;

    for outcome in &outcomes {
        println!("{}", format_outcome(outcome));
    }
    let summary = ValidationSummary::from_outcomes(&outcomes);
    println!(
        "\n{} errors, {} warnings in {:.2}s",
        summary.total_errors,
        summary.total_warnings,
        summary.total_time.as_secs_f64()
    );

    Ok(if summary.all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn backups(config: &Config, action: BackupAction) -> Result<ExitCode> {
    let ledger = BackupLedger::new(config.backup_dir.clone());
    match action {
        BackupAction::List { file } => {
            let backups = ledger.list(file.as_deref())?;
            if backups.is_empty() {
                println!("No backups in {}", ledger.root().display());
            }
            for backup in backups {
                println!("{}", backup.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        BackupAction::Restore { file } => {
            if ledger.restore(&file)? {
                println!("✓ Restored {}", file.display());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("No backups found for {}", file.display());
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn stats(config: &Config, date: Option<String>) -> Result<ExitCode> {
    let date = date.unwrap_or_else(HealingLogger::today);
    let logger = HealingLogger::new(config.metrics_dir.clone())?;
    let summary = logger.summary(&date)?;
    println!("{}", format_summary(&date, &summary));
    Ok(ExitCode::SUCCESS)
}

pub fn format_outcome(outcome: &ValidationOutcome) -> String {
    let mut lines = vec![outcome.to_string()];
    lines.extend(outcome.errors.iter().map(|e| format!("  error: {}", e)));
    lines.extend(outcome.warnings.iter().map(|w| format!("  warning: {}", w)));
    lines.join("\n")
}

pub fn format_heal_report(result: &HealingResult) -> String {
    let mut lines = Vec::new();

    if result.attempts.is_empty() && result.success {
        lines.push("Code is already valid, nothing to heal.".to_string());
    }

    for attempt in &result.attempts {
        let errors: usize = attempt
            .validation_results
            .iter()
            .map(|o| o.errors.len())
            .sum();
        let note = if attempt.is_proposer_failure() {
            format!(" ({})", attempt.ai_response)
        } else if attempt.is_stagnant() {
            " (no change)".to_string()
        } else {
            String::new()
        };
        lines.push(format!(
            "Attempt {}: {} errors{}",
            attempt.attempt_number, errors, note
        ));
    }

    lines.push(result.to_string());
    for error in &result.errors_remaining {
        lines.push(format!("  remaining: {}", error));
    }
    lines.join("\n")
}

pub fn format_summary(date: &str, summary: &HealingSummary) -> String {
    if summary.total == 0 {
        return format!("No healing runs recorded for {}", date);
    }

    let mut output = format!(
        "Healing runs for {}\n\
         Total: {}\n\
         Successful: {} ({:.1}%)\n\
         Failed: {}\n\
         Avg attempts: {:.1}\n\
         Avg duration: {}ms\n\
         Errors fixed: {}",
        date,
        summary.total,
        summary.successful,
        summary.success_rate(),
        summary.failed,
        summary.avg_attempts,
        summary.avg_duration_ms,
        summary.total_errors_fixed
    );

    if !summary.top_languages.is_empty() {
        output.push_str("\n\nTop languages:");
        for (language, count) in &summary.top_languages {
            output.push_str(&format!("\n  {}: {}", language, count));
        }
    }
    output
}
