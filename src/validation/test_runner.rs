// Test execution check
//
// Locates the companion test file for a source file by naming convention and
// runs it with pytest. Missing tests are not a failure.

use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::process::{run_process, tool_available, ProcessSpec};
use super::types::{ValidationOutcome, ValidationStrategy};
use super::{Check, CheckInput, ValidatorSettings};

const TEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct TestCheck {
    project_root: PathBuf,
    python: String,
}

impl TestCheck {
    pub fn new(settings: &ValidatorSettings) -> Self {
        Self {
            project_root: settings.project_root.clone(),
            python: settings.python.clone(),
        }
    }

    /// Find the test file belonging to `source`, if any
    ///
    /// Looks for `test_<stem>` and `<stem>_test` in the project root, its
    /// `tests/` and `test/` directories, next to the source file, and in a
    /// `tests/` tree mirroring the source's location under the project root.
    pub fn find_test_file(&self, source: &Path) -> Option<PathBuf> {
        let stem = source.file_stem()?.to_str()?;
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let names = [format!("test_{}{}", stem, ext), format!("{}_test{}", stem, ext)];
        let dirs = ["", "tests", "test"];

        let mut candidates: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            for name in &names {
                candidates.push(self.project_root.join(dir).join(name));
            }
        }

        if let Some(parent) = source.parent() {
            for dir in dirs {
                for name in &names {
                    candidates.push(parent.join(dir).join(name));
                }
            }
        }

        // tests/<package path>/test_<stem>, mirroring the source tree
        let relative_parent = source
            .parent()
            .and_then(|p| p.strip_prefix(&self.project_root).ok());
        if let Some(rel) = relative_parent {
            let mirrored = self.project_root.join("tests").join(rel);
            for name in &names {
                candidates.push(mirrored.join(name));
            }
            // src/pkg/mod.py -> tests/pkg/test_mod.py
            let mut components = rel.components();
            components.next();
            let without_top = components.as_path();
            if !without_top.as_os_str().is_empty() {
                for name in &names {
                    candidates.push(self.project_root.join("tests").join(without_top).join(name));
                }
            }
        }

        candidates.into_iter().find(|candidate| candidate.is_file())
    }
}

/// One error per failing or erroring test in pytest's verbose output
fn failing_tests(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.contains("FAILED") || line.contains("ERROR"))
        .map(|line| line.trim().to_string())
        .collect()
}

#[async_trait]
impl Check for TestCheck {
    fn strategy(&self) -> ValidationStrategy {
        ValidationStrategy::Tests
    }

    async fn run(&self, input: &CheckInput<'_>) -> ValidationOutcome {
        let start = Instant::now();

        let Some(source) = input.file_path else {
            return ValidationOutcome::skipped(
                ValidationStrategy::Tests,
                "No file path provided for test validation",
                start.elapsed(),
            );
        };

        let Some(test_file) = self.find_test_file(source) else {
            return ValidationOutcome::skipped(
                ValidationStrategy::Tests,
                format!("No test file found for {}", source.display()),
                start.elapsed(),
            );
        };

        if !tool_available(&self.python) {
            return ValidationOutcome::skipped(
                ValidationStrategy::Tests,
                format!("{} not installed - skipping test validation", self.python),
                start.elapsed(),
            );
        }

        let spec = ProcessSpec::new(
            self.python.clone(),
            [
                "-m".to_string(),
                "pytest".to_string(),
                test_file.display().to_string(),
                "-v".to_string(),
                "--tb=short".to_string(),
            ],
        )
        .cwd(&self.project_root)
        .timeout(TEST_TIMEOUT);

        let output = run_process(&spec).await;

        if output.missing_module("pytest") {
            return ValidationOutcome::skipped(
                ValidationStrategy::Tests,
                "pytest not installed - skipping test validation",
                start.elapsed(),
            );
        }

        let mut errors = Vec::new();
        if !output.success() {
            errors = failing_tests(&output.stdout);
            if errors.is_empty() {
                if output.returncode == -1 {
                    errors.push(format!("Tests failed: {}", output.stderr.trim()));
                } else {
                    errors.push(format!("Tests failed with exit code {}", output.returncode));
                }
            }
        }

        ValidationOutcome::from_diagnostics(
            ValidationStrategy::Tests,
            errors,
            Vec::new(),
            start.elapsed(),
        )
        .with_details(json!({
            "test_file": test_file.display().to_string(),
            "test_output": output.stdout,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_for(root: &Path) -> TestCheck {
        TestCheck::new(&ValidatorSettings {
            project_root: root.to_path_buf(),
            ..ValidatorSettings::default()
        })
    }

    #[test]
    fn test_finds_test_prefixed_file_in_tests_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tests")).unwrap();
        std::fs::write(dir.path().join("tests/test_calc.py"), "").unwrap();

        let found = check_for(dir.path()).find_test_file(&dir.path().join("calc.py"));
        assert_eq!(found, Some(dir.path().join("tests/test_calc.py")));
    }

    #[test]
    fn test_finds_sibling_suffix_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/calc_test.py"), "").unwrap();

        let found = check_for(dir.path()).find_test_file(&dir.path().join("pkg/calc.py"));
        assert_eq!(found, Some(dir.path().join("pkg/calc_test.py")));
    }

    #[test]
    fn test_finds_mirrored_tests_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tests/utils")).unwrap();
        std::fs::write(dir.path().join("tests/utils/test_text.py"), "").unwrap();

        let found =
            check_for(dir.path()).find_test_file(&dir.path().join("mypkg/utils/text.py"));
        assert_eq!(found, Some(dir.path().join("tests/utils/test_text.py")));
    }

    #[tokio::test]
    async fn test_no_path_is_a_warning_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = check_for(dir.path())
            .run(&CheckInput {
                code: "",
                language: "python",
                file_path: None,
            })
            .await;
        assert!(outcome.is_valid);
        assert_eq!(outcome.warnings, vec!["No file path provided for test validation"]);
    }

    #[tokio::test]
    async fn test_missing_test_file_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("lonely.py");
        let outcome = check_for(dir.path())
            .run(&CheckInput {
                code: "",
                language: "python",
                file_path: Some(source.as_path()),
            })
            .await;
        assert!(outcome.is_valid);
        assert!(outcome.warnings[0].starts_with("No test file found for"));
    }

    #[test]
    fn test_failing_lines_are_collected() {
        let stdout = "tests/test_calc.py::test_add PASSED\n\
                      tests/test_calc.py::test_sub FAILED\n\
                      ERROR tests/test_calc.py::test_div - ZeroDivisionError\n";
        let errors = failing_tests(stdout);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].ends_with("test_sub FAILED"));
    }
}
