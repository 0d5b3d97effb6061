// Configuration loader
// Loads ~/.mender/config.toml, falling back to defaults plus environment API keys

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::CONFIG_FILE_NAME;
use super::provider::ProviderEntry;
use super::settings::{app_dir, Config, ValidationSection};
use crate::errors;
use crate::healing::HealingConfig;

/// On-disk shape of config.toml; every section is optional
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    providers: Vec<ProviderEntry>,
    #[serde(default)]
    healing: Option<HealingConfig>,
    #[serde(default)]
    validation: Option<ValidationSection>,
    #[serde(default)]
    backup_dir: Option<PathBuf>,
    #[serde(default)]
    metrics_dir: Option<PathBuf>,
}

pub fn default_config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE_NAME)
}

/// Load configuration from the default location
pub fn load_config() -> Result<Config> {
    load_config_from(&default_config_path())
}

/// Load configuration from `path`; a missing file yields defaults
pub fn load_config_from(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config(&contents)?
    } else {
        tracing::debug!("No config file at {}, using defaults", path.display());
        Config::default()
    };

    if config.providers.is_empty() {
        config.providers = providers_from_env();
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn parse_config(contents: &str) -> Result<Config> {
    let toml_config: TomlConfig = toml::from_str(contents)
        .map_err(|e| anyhow::anyhow!(errors::config_parse_error(&e.to_string())))?;

    let mut config = Config::with_providers(toml_config.providers);
    if let Some(healing) = toml_config.healing {
        config.healing = healing;
    }
    if let Some(validation) = toml_config.validation {
        config.validation = validation;
    }
    if let Some(dir) = toml_config.backup_dir {
        config.backup_dir = dir;
    }
    if let Some(dir) = toml_config.metrics_dir {
        config.metrics_dir = dir;
    }
    Ok(config)
}

fn providers_from_env() -> Vec<ProviderEntry> {
    let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
        vec![ProviderEntry::claude_from_env(key)]
    } else if let Some(key) = non_empty("OPENAI_API_KEY") {
        vec![ProviderEntry::openai_from_env(key)]
    } else {
        Vec::new()
    }
}
