// Healing run records

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::validation::ValidationOutcome;

/// One iteration of the heal loop: a validation pass and a fix proposal
///
/// Built only once the run has finished, so `success` is final when the
/// record is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingAttempt {
    /// 1-based
    pub attempt_number: u32,
    /// Code this iteration started from
    pub original_code: String,
    /// Code the proposer returned
    pub fixed_code: String,
    /// Outcomes that triggered the fix request
    pub validation_results: Vec<ValidationOutcome>,
    pub ai_prompt: String,
    pub ai_response: String,
    pub timestamp: DateTime<Local>,
    pub success: bool,
}

impl HealingAttempt {
    /// The proposer returned its input unchanged
    pub fn is_stagnant(&self) -> bool {
        self.original_code == self.fixed_code
    }

    /// The model call failed and the response holds the error text
    pub fn is_proposer_failure(&self) -> bool {
        self.ai_response.starts_with("Error: ")
    }
}

/// Terminal record of one heal invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingResult {
    pub success: bool,
    pub original_code: String,
    pub final_code: String,
    /// Empty when the input was already valid
    pub attempts: Vec<HealingAttempt>,
    pub total_time: Duration,
    /// Errors present initially and absent at the end, in original order
    pub errors_fixed: Vec<String>,
    /// Errors reported by the last validation pass
    pub errors_remaining: Vec<String>,
}

impl HealingResult {
    pub fn changed(&self) -> bool {
        self.original_code != self.final_code
    }
}

impl fmt::Display for HealingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "✓ Success" } else { "✗ Failed" };
        write!(
            f,
            "{} after {} attempts ({:.2}s): {} fixed, {} remaining",
            status,
            self.attempts.len(),
            self.total_time.as_secs_f64(),
            self.errors_fixed.len(),
            self.errors_remaining.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(success: bool) -> HealingResult {
        HealingResult {
            success,
            original_code: "a".into(),
            final_code: "b".into(),
            attempts: vec![],
            total_time: Duration::from_millis(1500),
            errors_fixed: vec!["e1".into()],
            errors_remaining: vec![],
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            result(true).to_string(),
            "✓ Success after 0 attempts (1.50s): 1 fixed, 0 remaining"
        );
        assert!(result(false).to_string().starts_with("✗ Failed"));
    }

    #[test]
    fn test_attempt_flags() {
        let attempt = HealingAttempt {
            attempt_number: 1,
            original_code: "x".into(),
            fixed_code: "x".into(),
            validation_results: vec![],
            ai_prompt: String::new(),
            ai_response: "Error: timed out".into(),
            timestamp: Local::now(),
            success: false,
        };
        assert!(attempt.is_stagnant());
        assert!(attempt.is_proposer_failure());
    }

    #[test]
    fn test_result_serializes() {
        let json = serde_json::to_value(result(true)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["errors_fixed"][0], "e1");
    }
}
