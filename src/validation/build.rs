// Project build check
//
// Picks the first known build descriptor in the project root and runs the
// matching check command.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::process::{run_process, tool_available, ProcessOutput, ProcessSpec};
use super::types::{ValidationOutcome, ValidationStrategy};
use super::{Check, CheckInput, ValidatorSettings};

const BUILD_TIMEOUT: Duration = Duration::from_secs(30);

/// Build descriptors in priority order
const DESCRIPTORS: [&str; 5] = ["pyproject.toml", "Cargo.toml", "package.json", "go.mod", "Makefile"];

pub struct BuildCheck {
    project_root: PathBuf,
    python: String,
}

/// Command to run for a descriptor, with the label used in its error line
struct BuildCommand {
    label: &'static str,
    program: String,
    args: Vec<&'static str>,
}

impl BuildCheck {
    pub fn new(settings: &ValidatorSettings) -> Self {
        Self {
            project_root: settings.project_root.clone(),
            python: settings.python.clone(),
        }
    }

    /// First descriptor present in the project root
    pub fn detect_descriptor(&self) -> Option<&'static str> {
        DESCRIPTORS
            .into_iter()
            .find(|name| self.project_root.join(name).is_file())
    }

    fn command_for(&self, descriptor: &str) -> Option<BuildCommand> {
        let command = match descriptor {
            "pyproject.toml" if tool_available("poetry") => BuildCommand {
                label: "Poetry check",
                program: "poetry".to_string(),
                args: vec!["check"],
            },
            "pyproject.toml" => BuildCommand {
                label: "Pip check",
                program: self.python.clone(),
                args: vec!["-m", "pip", "check"],
            },
            "Cargo.toml" => BuildCommand {
                label: "Cargo check",
                program: "cargo".to_string(),
                args: vec!["check", "--quiet"],
            },
            "package.json" => BuildCommand {
                label: "npm build",
                program: "npm".to_string(),
                args: vec!["run", "build", "--if-present"],
            },
            "go.mod" => BuildCommand {
                label: "Go build",
                program: "go".to_string(),
                args: vec!["build", "./..."],
            },
            "Makefile" => BuildCommand {
                label: "Make dry-run",
                program: "make".to_string(),
                args: vec!["--dry-run"],
            },
            _ => return None,
        };
        Some(command)
    }
}

fn failure_text(output: &ProcessOutput) -> String {
    let stdout = output.stdout.trim();
    if stdout.is_empty() {
        output.stderr.trim().to_string()
    } else {
        stdout.to_string()
    }
}

#[async_trait]
impl Check for BuildCheck {
    fn strategy(&self) -> ValidationStrategy {
        ValidationStrategy::Build
    }

    async fn run(&self, _input: &CheckInput<'_>) -> ValidationOutcome {
        let start = Instant::now();

        let Some(command) = self.detect_descriptor().and_then(|d| self.command_for(d)) else {
            return ValidationOutcome::skipped(
                ValidationStrategy::Build,
                "No build configuration found",
                start.elapsed(),
            );
        };

        if !tool_available(&command.program) {
            return ValidationOutcome::skipped(
                ValidationStrategy::Build,
                format!("{} not available", command.program),
                start.elapsed(),
            );
        }

        let spec = ProcessSpec::new(command.program.clone(), command.args.clone())
            .cwd(&self.project_root)
            .timeout(BUILD_TIMEOUT);
        let output = run_process(&spec).await;

        let mut errors = Vec::new();
        if !output.success() {
            errors.push(format!("{} failed: {}", command.label, failure_text(&output)));
        }

        ValidationOutcome::from_diagnostics(
            ValidationStrategy::Build,
            errors,
            Vec::new(),
            start.elapsed(),
        )
    }
}
