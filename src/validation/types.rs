// Validation data types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Kind of check run against a piece of code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStrategy {
    Syntax,
    #[serde(alias = "typecheck")]
    TypeCheck,
    Lint,
    Tests,
    Build,
    Custom,
}

impl ValidationStrategy {
    pub const ALL: [ValidationStrategy; 6] = [
        ValidationStrategy::Syntax,
        ValidationStrategy::TypeCheck,
        ValidationStrategy::Lint,
        ValidationStrategy::Tests,
        ValidationStrategy::Build,
        ValidationStrategy::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStrategy::Syntax => "syntax",
            ValidationStrategy::TypeCheck => "type_check",
            ValidationStrategy::Lint => "lint",
            ValidationStrategy::Tests => "tests",
            ValidationStrategy::Build => "build",
            ValidationStrategy::Custom => "custom",
        }
    }
}

impl fmt::Display for ValidationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "syntax" => Ok(ValidationStrategy::Syntax),
            "type_check" | "typecheck" | "types" => Ok(ValidationStrategy::TypeCheck),
            "lint" => Ok(ValidationStrategy::Lint),
            "tests" | "test" => Ok(ValidationStrategy::Tests),
            "build" => Ok(ValidationStrategy::Build),
            "custom" => Ok(ValidationStrategy::Custom),
            other => Err(format!(
                "unknown validation strategy '{}' (expected one of: syntax, type_check, lint, tests, build, custom)",
                other
            )),
        }
    }
}

/// One checker's verdict on a piece of code
///
/// `is_valid` normally mirrors `errors.is_empty()`, but a checker may pass
/// with diagnostics that only live in `warnings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub strategy: ValidationStrategy,
    #[serde(default)]
    pub execution_time: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ValidationOutcome {
    /// Build an outcome whose validity follows from the error list
    pub fn from_diagnostics(
        strategy: ValidationStrategy,
        errors: Vec<String>,
        warnings: Vec<String>,
        execution_time: Duration,
    ) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            strategy,
            execution_time,
            details: None,
        }
    }

    /// A passing outcome carrying a single explanatory warning
    pub fn skipped(
        strategy: ValidationStrategy,
        warning: impl Into<String>,
        execution_time: Duration,
    ) -> Self {
        Self::from_diagnostics(strategy, Vec::new(), vec![warning.into()], execution_time)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_valid { "✓ Valid" } else { "✗ Invalid" };
        write!(
            f,
            "{} ({}): {} errors, {} warnings",
            status,
            self.strategy,
            self.errors.len(),
            self.warnings.len()
        )
    }
}

/// Aggregate view over one validation pass
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub all_valid: bool,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_time: Duration,
    pub strategies_run: Vec<ValidationStrategy>,
    pub failed_strategies: Vec<ValidationStrategy>,
}

impl ValidationSummary {
    pub fn from_outcomes(outcomes: &[ValidationOutcome]) -> Self {
        Self {
            all_valid: outcomes.iter().all(|o| o.is_valid),
            total_errors: outcomes.iter().map(|o| o.errors.len()).sum(),
            total_warnings: outcomes.iter().map(|o| o.warnings.len()).sum(),
            total_time: outcomes.iter().map(|o| o.execution_time).sum(),
            strategies_run: outcomes.iter().map(|o| o.strategy).collect(),
            failed_strategies: outcomes
                .iter()
                .filter(|o| !o.is_valid)
                .map(|o| o.strategy)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_wire_names() {
        assert_eq!(
            serde_json::to_string(&ValidationStrategy::TypeCheck).unwrap(),
            "\"type_check\""
        );
        let legacy: ValidationStrategy = serde_json::from_str("\"typecheck\"").unwrap();
        assert_eq!(legacy, ValidationStrategy::TypeCheck);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("Lint".parse::<ValidationStrategy>(), Ok(ValidationStrategy::Lint));
        assert!("format".parse::<ValidationStrategy>().is_err());
    }

    #[test]
    fn test_outcome_display() {
        let outcome = ValidationOutcome::from_diagnostics(
            ValidationStrategy::Syntax,
            vec!["Line 1: invalid syntax".to_string()],
            vec![],
            Duration::ZERO,
        );
        assert!(!outcome.is_valid);
        assert_eq!(outcome.to_string(), "✗ Invalid (syntax): 1 errors, 0 warnings");
    }

    #[test]
    fn test_valid_outcome_may_carry_warnings() {
        let outcome = ValidationOutcome::skipped(
            ValidationStrategy::Lint,
            "flake8 not installed - skipping lint check",
            Duration::ZERO,
        );
        assert!(outcome.is_valid);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_summary_counts_failures() {
        let outcomes = vec![
            ValidationOutcome::from_diagnostics(
                ValidationStrategy::Syntax,
                vec!["a".into()],
                vec!["w".into()],
                Duration::from_millis(5),
            ),
            ValidationOutcome::from_diagnostics(
                ValidationStrategy::Lint,
                vec![],
                vec![],
                Duration::from_millis(10),
            ),
        ];

        let summary = ValidationSummary::from_outcomes(&outcomes);
        assert!(!summary.all_valid);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.total_warnings, 1);
        assert_eq!(summary.total_time, Duration::from_millis(15));
        assert_eq!(summary.failed_strategies, vec![ValidationStrategy::Syntax]);
    }
}
