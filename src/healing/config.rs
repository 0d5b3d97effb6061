// Healing policy

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::validation::ValidationStrategy;

/// How a heal run is bounded and what it checks
///
/// Deserializes from a partial `[healing]` table; missing fields take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealingConfig {
    pub max_attempts: u32,

    /// Checks run on every validation pass, in this order
    pub strategies: Vec<ValidationStrategy>,

    /// Ask before writing a fix to disk. Enforced by the caller, not the healer.
    pub require_user_confirmation: bool,

    /// Snapshot the file to the backup ledger before the first attempt
    pub save_before_healing: bool,

    /// Per model call
    pub timeout_seconds: u64,

    /// Count a reduced error count as success when the budget runs out
    pub retry_on_partial_success: bool,

    /// Pass caller context and stagnation notes to the fix prompt
    pub include_context: bool,

    pub temperature: f32,
}

impl Default for HealingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            strategies: vec![ValidationStrategy::Syntax],
            require_user_confirmation: true,
            save_before_healing: true,
            timeout_seconds: 60,
            retry_on_partial_success: true,
            include_context: true,
            temperature: 0.3,
        }
    }
}

impl HealingConfig {
    /// Every static check, more attempts, longer model timeout
    pub fn strict() -> Self {
        Self {
            max_attempts: 5,
            strategies: vec![
                ValidationStrategy::Syntax,
                ValidationStrategy::TypeCheck,
                ValidationStrategy::Lint,
            ],
            require_user_confirmation: true,
            save_before_healing: true,
            timeout_seconds: 120,
            ..Self::default()
        }
    }

    /// Syntax only, two attempts, no confirmation
    pub fn quick() -> Self {
        Self {
            max_attempts: 2,
            strategies: vec![ValidationStrategy::Syntax],
            require_user_confirmation: false,
            save_before_healing: true,
            timeout_seconds: 30,
            ..Self::default()
        }
    }

    /// Look up a preset by name ("default", "strict", "quick")
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "strict" => Some(Self::strict()),
            "quick" => Some(Self::quick()),
            _ => None,
        }
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
