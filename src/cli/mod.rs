// CLI module
// Public interface for the command-line surface

mod args;
mod commands;

pub use args::{BackupAction, Cli, Commands, Preset};
pub use commands::{format_heal_report, format_outcome, format_summary, run_command, HealOptions};
