// Healing engine
//
// Validate code, ask a model for a fix, revalidate, repeat within a bounded
// attempt budget. Files are snapshotted to the backup ledger before healing.

mod backup;
mod config;
mod extract;
mod healer;
mod language;
mod prompt;
mod proposer;
mod stats;
mod types;

pub use backup::BackupLedger;
pub use config::HealingConfig;
pub use extract::{extract_code, looks_like_code};
pub use healer::{AutoHealer, HealRequest, STAGNATION_NOTE};
pub use language::{detect_language, FALLBACK_LANGUAGE};
pub use prompt::{build_fix_prompt, render_template, system_prompt, PromptParts};
pub use proposer::{FixProposal, FixProposer, FixRequest};
pub use stats::HealingStats;
pub use types::{HealingAttempt, HealingResult};
