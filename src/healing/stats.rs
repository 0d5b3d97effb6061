// Aggregate statistics over a healer's history

use serde::Serialize;
use std::time::Duration;

use super::types::HealingResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealingStats {
    pub total_healings: usize,
    pub successful: usize,
    pub failed: usize,
    /// Percentage, 0.0 to 100.0
    pub success_rate: f64,
    pub avg_attempts: f64,
    pub avg_time: Duration,
    pub total_errors_fixed: usize,
}

impl HealingStats {
    pub fn from_history(history: &[HealingResult]) -> Self {
        if history.is_empty() {
            return Self::default();
        }

        let total = history.len();
        let successful = history.iter().filter(|r| r.success).count();
        let total_attempts: usize = history.iter().map(|r| r.attempts.len()).sum();
        let total_time: Duration = history.iter().map(|r| r.total_time).sum();

        Self {
            total_healings: total,
            successful,
            failed: total - successful,
            success_rate: successful as f64 / total as f64 * 100.0,
            avg_attempts: total_attempts as f64 / total as f64,
            avg_time: total_time / total as u32,
            total_errors_fixed: history.iter().map(|r| r.errors_fixed.len()).sum(),
        }
    }
}
