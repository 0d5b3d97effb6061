// User-supplied validation script

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::process::{run_process, ProcessSpec};
use super::types::{ValidationOutcome, ValidationStrategy};
use super::{Check, CheckInput, ValidatorSettings};

const CUSTOM_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs `/bin/sh -c <script>` with the code on stdin
pub struct CustomCheck {
    script: Option<String>,
    project_root: PathBuf,
}

impl CustomCheck {
    pub fn new(settings: &ValidatorSettings) -> Self {
        Self {
            script: settings.custom_script.clone(),
            project_root: settings.project_root.clone(),
        }
    }
}

#[async_trait]
impl Check for CustomCheck {
    fn strategy(&self) -> ValidationStrategy {
        ValidationStrategy::Custom
    }

    async fn run(&self, input: &CheckInput<'_>) -> ValidationOutcome {
        let start = Instant::now();

        let Some(ref script) = self.script else {
            return ValidationOutcome::skipped(
                ValidationStrategy::Custom,
                "No custom validation script configured",
                start.elapsed(),
            );
        };

        let spec = ProcessSpec::new("/bin/sh", ["-c", script.as_str()])
            .cwd(&self.project_root)
            .stdin(input.code)
            .timeout(CUSTOM_TIMEOUT);
        let output = run_process(&spec).await;

        let mut errors = Vec::new();
        if !output.success() {
            errors.extend(
                output
                    .stdout
                    .lines()
                    .chain(output.stderr.lines())
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from),
            );
            if errors.is_empty() {
                errors.push(format!(
                    "Custom validation failed with exit code {}",
                    output.returncode
                ));
            }
        }

        ValidationOutcome::from_diagnostics(
            ValidationStrategy::Custom,
            errors,
            Vec::new(),
            start.elapsed(),
        )
    }
}
