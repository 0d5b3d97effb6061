// Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::healing::HealingConfig;
use crate::validation::ValidationStrategy;

#[derive(Debug, Parser)]
#[command(
    name = "mender",
    version,
    about = "Validate source files and repair them with a language model"
)]
pub struct Cli {
    /// Debug logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.mender/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Default,
    Strict,
    Quick,
}

impl Preset {
    pub fn healing_config(self) -> HealingConfig {
        match self {
            Preset::Default => HealingConfig::default(),
            Preset::Strict => HealingConfig::strict(),
            Preset::Quick => HealingConfig::quick(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a file and ask the model to fix what fails
    Heal {
        file: PathBuf,
        /// Start from a preset instead of the configured policy
        #[arg(long, value_enum)]
        preset: Option<Preset>,
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Repeatable; replaces the configured strategies
        #[arg(long = "strategy")]
        strategies: Vec<ValidationStrategy>,
        /// Extra context for the fix prompt
        #[arg(long)]
        context: Option<String>,
        /// Write the healed code back to the file
        #[arg(long)]
        save: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        #[arg(long)]
        no_backup: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run validation strategies against a file
    Validate {
        file: PathBuf,
        #[arg(long = "strategy")]
        strategies: Vec<ValidationStrategy>,
    },
    /// Inspect or restore pre-heal backups
    Backups {
        #[command(subcommand)]
        action: BackupAction,
    },
    /// Daily healing summary
    Stats {
        /// YYYY-MM-DD, defaults to today (UTC)
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum BackupAction {
    /// List backups, newest first
    List { file: Option<PathBuf> },
    /// Copy the newest backup over the file
    Restore { file: PathBuf },
}
