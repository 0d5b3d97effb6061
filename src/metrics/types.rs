// Metrics data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::healing::HealingResult;

/// One line of the daily healing log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingRecord {
    pub timestamp: DateTime<Utc>,
    /// SHA256 of the input code; the code itself is never logged
    pub code_hash: String,
    pub language: String,
    pub file: Option<String>,
    pub success: bool,
    pub attempts: usize,
    pub errors_fixed: usize,
    pub errors_remaining: usize,
    pub duration_ms: u64,
}

impl HealingRecord {
    pub fn from_result(
        result: &HealingResult,
        code_hash: String,
        language: &str,
        file: Option<&Path>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            code_hash,
            language: language.to_string(),
            file: file.map(|p| p.display().to_string()),
            success: result.success,
            attempts: result.attempts.len(),
            errors_fixed: result.errors_fixed.len(),
            errors_remaining: result.errors_remaining.len(),
            duration_ms: result.total_time.as_millis() as u64,
        }
    }
}

/// Daily roll-up for the `stats` command
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealingSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub avg_attempts: f64,
    pub avg_duration_ms: u64,
    pub total_errors_fixed: usize,
    /// Most healed languages, at most three
    pub top_languages: Vec<(String, usize)>,
}

impl HealingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }
}
