// Type checking (mypy) and linting (flake8)
//
// Both tools only understand files, so the code is written to a scratch file
// first and the scratch path is swapped back for the real one in diagnostics.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::warn;

use super::process::{run_process, tool_available, ProcessOutput, ProcessSpec};
use super::types::{ValidationOutcome, ValidationStrategy};
use super::{Check, CheckInput, ValidatorSettings};

const TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// `path:line:col: E501 message`
static FLAKE8_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\d+:(?:\d+:)?\s*([A-Z])\d+").expect("valid regex"));

/// How a tool's stdout lines map onto errors and warnings
#[derive(Debug, Clone, Copy)]
enum Severity {
    Error,
    Warning,
}

struct ToolRun {
    /// Human name used in warnings ("Type check", "Lint check")
    label: &'static str,
    /// Python module run with `-m`
    module: &'static str,
    args: &'static [&'static str],
    classify: fn(&str) -> Severity,
}

fn classify_mypy(line: &str) -> Severity {
    if line.to_lowercase().contains("error:") {
        Severity::Error
    } else {
        Severity::Warning
    }
}

fn classify_flake8(line: &str) -> Severity {
    match FLAKE8_LINE.captures(line).and_then(|c| c.get(1)) {
        Some(code) if matches!(code.as_str(), "E" | "F") => Severity::Error,
        _ => Severity::Warning,
    }
}

const MYPY: ToolRun = ToolRun {
    label: "Type check",
    module: "mypy",
    args: &["--no-error-summary"],
    classify: classify_mypy,
};

const FLAKE8: ToolRun = ToolRun {
    label: "Lint check",
    module: "flake8",
    args: &["--max-line-length=100"],
    classify: classify_flake8,
};

/// Split tool stdout into (errors, warnings); unrecognised lines are warnings
fn classify_output(
    output: &ProcessOutput,
    scratch: &str,
    original: Option<&Path>,
    classify: fn(&str) -> Severity,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for raw in output.stdout.lines() {
        if raw.trim().is_empty() {
            continue;
        }
        let line = match original {
            Some(path) => raw.replace(scratch, &path.display().to_string()),
            None => raw.to_string(),
        };
        match classify(&line) {
            Severity::Error => errors.push(line),
            Severity::Warning => warnings.push(line),
        }
    }

    (errors, warnings)
}

async fn run_python_tool(
    tool: &ToolRun,
    strategy: ValidationStrategy,
    python: &str,
    input: &CheckInput<'_>,
) -> ValidationOutcome {
    let start = Instant::now();

    if !input.language.eq_ignore_ascii_case("python") {
        let what = match strategy {
            ValidationStrategy::TypeCheck => "Type checking",
            _ => "Linting",
        };
        return ValidationOutcome::skipped(
            strategy,
            format!("{} not supported for {}", what, input.language),
            start.elapsed(),
        );
    }

    if !tool_available(python) {
        return ValidationOutcome::skipped(
            strategy,
            format!("{} not installed - skipping {}", python, tool.label.to_lowercase()),
            start.elapsed(),
        );
    }

    let scratch = match write_scratch(input.code) {
        Ok(file) => file,
        Err(e) => {
            warn!("{}: could not write scratch file: {}", tool.label, e);
            return ValidationOutcome::skipped(
                strategy,
                format!("{} failed: {}", tool.label, e),
                start.elapsed(),
            );
        }
    };
    let scratch_path = scratch.path().display().to_string();

    let mut args = vec!["-m".to_string(), tool.module.to_string()];
    args.extend(tool.args.iter().map(|a| a.to_string()));
    args.push(scratch_path.clone());

    let output = run_process(&ProcessSpec::new(python, args).timeout(TOOL_TIMEOUT)).await;

    let (errors, mut warnings) = if output.missing_module(tool.module) {
        (
            Vec::new(),
            vec![format!(
                "{} not installed - skipping {}",
                tool.module,
                tool.label.to_lowercase()
            )],
        )
    } else if output.returncode == -1 {
        (
            Vec::new(),
            vec![format!("{} failed: {}", tool.label, output.stderr.trim())],
        )
    } else if output.success() {
        (Vec::new(), Vec::new())
    } else {
        classify_output(&output, &scratch_path, input.file_path, tool.classify)
    };

    if errors.is_empty() && warnings.is_empty() && !output.success() && output.returncode != -1 {
        // Non-zero exit with nothing on stdout; surface stderr rather than pass silently
        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            warnings.push(format!("{} exited with {}: {}", tool.label, output.returncode, stderr));
        }
    }

    ValidationOutcome::from_diagnostics(strategy, errors, warnings, start.elapsed())
}

fn write_scratch(code: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("mender_")
        .suffix(".py")
        .tempfile()?;
    file.write_all(code.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// mypy-backed type check
pub struct TypeCheck {
    python: String,
}

impl TypeCheck {
    pub fn new(settings: &ValidatorSettings) -> Self {
        Self {
            python: settings.python.clone(),
        }
    }
}

#[async_trait]
impl Check for TypeCheck {
    fn strategy(&self) -> ValidationStrategy {
        ValidationStrategy::TypeCheck
    }

    async fn run(&self, input: &CheckInput<'_>) -> ValidationOutcome {
        run_python_tool(&MYPY, ValidationStrategy::TypeCheck, &self.python, input).await
    }
}

/// flake8-backed lint
pub struct LintCheck {
    python: String,
}

impl LintCheck {
    pub fn new(settings: &ValidatorSettings) -> Self {
        Self {
            python: settings.python.clone(),
        }
    }
}

#[async_trait]
impl Check for LintCheck {
    fn strategy(&self) -> ValidationStrategy {
        ValidationStrategy::Lint
    }

    async fn run(&self, input: &CheckInput<'_>) -> ValidationOutcome {
        run_python_tool(&FLAKE8, ValidationStrategy::Lint, &self.python, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            returncode: 1,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_flake8_classification() {
        let out = output(
            "/tmp/mender_x.py:1:1: F401 'os' imported but unused\n\
             /tmp/mender_x.py:3:80: E501 line too long\n\
             /tmp/mender_x.py:4:1: W391 blank line at end of file\n\
             /tmp/mender_x.py:5:1: C901 too complex\n\
             something flake8 printed that we don't recognise\n",
        );
        let (errors, warnings) = classify_output(
            &out,
            "/tmp/mender_x.py",
            Some(Path::new("src/app.py")),
            classify_flake8,
        );

        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("src/app.py:1:1: F401"));
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("don't recognise")));
    }

    #[test]
    fn test_mypy_classification_keeps_notes_as_warnings() {
        let out = output(
            "/tmp/s.py:2: error: Incompatible return value type\n\
             /tmp/s.py:2: note: See https://mypy.readthedocs.io\n",
        );
        let (errors, warnings) = classify_output(&out, "/tmp/s.py", None, classify_mypy);
        assert_eq!(errors, vec!["/tmp/s.py:2: error: Incompatible return value type"]);
        assert_eq!(warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_non_python_is_skipped() {
        let check = LintCheck::new(&ValidatorSettings::default());
        let outcome = check
            .run(&CheckInput {
                code: "let x = 1;",
                language: "javascript",
                file_path: None,
            })
            .await;
        assert!(outcome.is_valid);
        assert_eq!(outcome.warnings, vec!["Linting not supported for javascript"]);
    }

    #[tokio::test]
    async fn test_missing_interpreter_degrades_to_warning() {
        let settings = ValidatorSettings {
            python: "no-such-python-interpreter".to_string(),
            ..ValidatorSettings::default()
        };
        let outcome = TypeCheck::new(&settings)
            .run(&CheckInput {
                code: "x: int = 'a'",
                language: "python",
                file_path: None,
            })
            .await;
        assert!(outcome.is_valid);
        assert!(outcome.warnings[0].contains("not installed"));
    }
}
