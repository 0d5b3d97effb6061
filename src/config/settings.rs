// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::constants::{APP_DIR_NAME, DEFAULT_PYTHON};
use super::provider::ProviderEntry;
use crate::healing::HealingConfig;
use crate::validation::ValidatorSettings;

/// `[validation]` table: where external checkers run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationSection {
    /// Python interpreter used for mypy / flake8 / pytest / pip
    #[serde(default = "default_python")]
    pub python: String,

    /// Project root for tests and build checks (defaults to the working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,

    /// Shell script for the `custom` strategy; receives the code on stdin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_script: Option<String>,
}

fn default_python() -> String {
    DEFAULT_PYTHON.to_string()
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            python: default_python(),
            project_root: None,
            custom_script: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Model providers in priority order; the first one is used for healing
    pub providers: Vec<ProviderEntry>,

    /// Healing policy
    pub healing: HealingConfig,

    /// External checker settings
    pub validation: ValidationSection,

    /// Backup ledger root
    pub backup_dir: PathBuf,

    /// Directory for daily JSONL healing logs
    pub metrics_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let app_dir = app_dir();
        Self {
            providers: Vec::new(),
            healing: HealingConfig::default(),
            validation: ValidationSection::default(),
            backup_dir: app_dir.join("backups"),
            metrics_dir: app_dir.join("metrics"),
        }
    }
}

/// `~/.mender`, or `./.mender` when the home directory is unknown
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

impl Config {
    pub fn with_providers(providers: Vec<ProviderEntry>) -> Self {
        Self {
            providers,
            ..Self::default()
        }
    }

    /// Settings handed to `CodeValidator`
    pub fn validator_settings(&self) -> ValidatorSettings {
        let defaults = ValidatorSettings::default();
        ValidatorSettings {
            project_root: self
                .validation
                .project_root
                .clone()
                .unwrap_or(defaults.project_root),
            python: self.validation.python.clone(),
            custom_script: self.validation.custom_script.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.healing.max_attempts == 0 {
            bail!("healing.max_attempts must be at least 1");
        }
        if !(0.0..=2.0).contains(&self.healing.temperature) {
            bail!(
                "healing.temperature must be between 0.0 and 2.0 (got {})",
                self.healing.temperature
            );
        }
        if self.healing.timeout_seconds == 0 {
            bail!("healing.timeout_seconds must be at least 1");
        }
        for entry in &self.providers {
            if entry.api_key().trim().is_empty() {
                bail!("Provider '{}' has an empty api_key", entry.display_name());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.backup_dir.ends_with("backups"));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let mut config = Config::default();
        config.healing.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_api_key() {
        let config = Config::with_providers(vec![ProviderEntry::claude_from_env("  ".into())]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validator_settings_carry_script() {
        let mut config = Config::default();
        config.validation.custom_script = Some("exit 0".to_string());
        config.validation.project_root = Some(PathBuf::from("/srv/app"));

        let settings = config.validator_settings();
        assert_eq!(settings.custom_script.as_deref(), Some("exit 0"));
        assert_eq!(settings.project_root, PathBuf::from("/srv/app"));
        assert_eq!(settings.python, "python3");
    }
}
