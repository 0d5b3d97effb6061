// Validation strategy executor
//
// Each strategy is a `Check` capability. `CodeValidator` holds one check per
// strategy and runs the requested ones in order, one outcome per request.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub mod build;
pub mod custom;
pub mod process;
pub mod static_analysis;
pub mod syntax;
pub mod test_runner;
pub mod types;

pub use build::BuildCheck;
pub use custom::CustomCheck;
pub use process::{run_process, ProcessOutput, ProcessSpec};
pub use static_analysis::{LintCheck, TypeCheck};
pub use syntax::SyntaxCheck;
pub use test_runner::TestCheck;
pub use types::{ValidationOutcome, ValidationStrategy, ValidationSummary};

/// Everything a check may look at
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    pub code: &'a str,
    pub language: &'a str,
    pub file_path: Option<&'a Path>,
}

/// A single validation capability
///
/// Implementations must not fail: tool absence, timeouts and crashes are
/// reported through the returned outcome.
#[async_trait]
pub trait Check: Send + Sync {
    fn strategy(&self) -> ValidationStrategy;

    async fn run(&self, input: &CheckInput<'_>) -> ValidationOutcome;
}

/// Executor seam used by the healing controller
#[async_trait]
pub trait Validate: Send + Sync {
    async fn validate(
        &self,
        code: &str,
        language: &str,
        strategies: &[ValidationStrategy],
        file_path: Option<&Path>,
    ) -> Vec<ValidationOutcome>;
}

/// Where and how external checkers run
#[derive(Debug, Clone)]
pub struct ValidatorSettings {
    pub project_root: PathBuf,
    /// Interpreter used for `ast.parse` and for `-m mypy`, `-m flake8`, `-m pytest`, `-m pip`
    pub python: String,
    pub custom_script: Option<String>,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            project_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            python: "python3".to_string(),
            custom_script: None,
        }
    }
}

/// Default executor with the built-in checks registered
pub struct CodeValidator {
    checks: HashMap<ValidationStrategy, Arc<dyn Check>>,
}

impl CodeValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        let mut validator = Self::empty();
        validator.register(Arc::new(SyntaxCheck::new(&settings)));
        validator.register(Arc::new(TypeCheck::new(&settings)));
        validator.register(Arc::new(LintCheck::new(&settings)));
        validator.register(Arc::new(TestCheck::new(&settings)));
        validator.register(Arc::new(BuildCheck::new(&settings)));
        validator.register(Arc::new(CustomCheck::new(&settings)));
        validator
    }

    /// Executor with no checks; every strategy reports "no validator registered"
    pub fn empty() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Install a check, replacing whatever handled its strategy before
    pub fn register(&mut self, check: Arc<dyn Check>) {
        self.checks.insert(check.strategy(), check);
    }

    pub fn has_check(&self, strategy: ValidationStrategy) -> bool {
        self.checks.contains_key(&strategy)
    }
}

impl Default for CodeValidator {
    fn default() -> Self {
        Self::new(ValidatorSettings::default())
    }
}

#[async_trait]
impl Validate for CodeValidator {
    #[instrument(skip(self, code), fields(language = %language, strategies = strategies.len()))]
    async fn validate(
        &self,
        code: &str,
        language: &str,
        strategies: &[ValidationStrategy],
        file_path: Option<&Path>,
    ) -> Vec<ValidationOutcome> {
        let input = CheckInput {
            code,
            language,
            file_path,
        };

        let mut outcomes = Vec::with_capacity(strategies.len());
        for &strategy in strategies {
            let outcome = match self.checks.get(&strategy) {
                Some(check) => check.run(&input).await,
                None => ValidationOutcome::skipped(
                    strategy,
                    format!("No validator registered for {}", strategy),
                    Duration::ZERO,
                ),
            };
            debug!("{}", outcome);
            outcomes.push(outcome);
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFails;

    #[async_trait]
    impl Check for AlwaysFails {
        fn strategy(&self) -> ValidationStrategy {
            ValidationStrategy::Custom
        }

        async fn run(&self, _input: &CheckInput<'_>) -> ValidationOutcome {
            ValidationOutcome::from_diagnostics(
                ValidationStrategy::Custom,
                vec!["nope".to_string()],
                vec![],
                Duration::ZERO,
            )
        }
    }

    #[tokio::test]
    async fn test_outcomes_follow_request_order() {
        let validator = CodeValidator::default();
        let strategies = [
            ValidationStrategy::Custom,
            ValidationStrategy::Syntax,
            ValidationStrategy::Tests,
        ];
        let outcomes = validator
            .validate("x = 1\n", "python", &strategies, None)
            .await;

        let produced: Vec<_> = outcomes.iter().map(|o| o.strategy).collect();
        assert_eq!(produced, strategies.to_vec());
        assert!(outcomes.iter().all(|o| o.is_valid));
    }

    #[tokio::test]
    async fn test_register_replaces_builtin() {
        let mut validator = CodeValidator::default();
        validator.register(Arc::new(AlwaysFails));

        let outcomes = validator
            .validate("x = 1", "python", &[ValidationStrategy::Custom], None)
            .await;
        assert_eq!(outcomes[0].errors, vec!["nope".to_string()]);
    }

    #[tokio::test]
    async fn test_unregistered_strategy_passes_with_warning() {
        let validator = CodeValidator::empty();
        assert!(!validator.has_check(ValidationStrategy::Build));

        let outcomes = validator
            .validate("x", "python", &[ValidationStrategy::Build], None)
            .await;
        assert!(outcomes[0].is_valid);
        assert_eq!(
            outcomes[0].warnings,
            vec!["No validator registered for build".to_string()]
        );
    }

    #[tokio::test]
    async fn test_duplicate_strategies_each_get_an_outcome() {
        let validator = CodeValidator::default();
        let outcomes = validator
            .validate(
                "def f(:",
                "python",
                &[ValidationStrategy::Syntax, ValidationStrategy::Syntax],
                None,
            )
            .await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].errors, outcomes[1].errors);
    }
}
