// Subprocess execution shared by every external check
//
// Spawns with piped stdio, feeds optional stdin, and waits under a timeout.
// Nothing here returns an error: spawn failures and timeouts are folded into
// a ProcessOutput with returncode -1.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// What to run
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<String>,
    pub timeout: Duration,
}

impl ProcessSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            stdin: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished (or abandoned) process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            returncode: -1,
            stdout: String::new(),
            stderr: message.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.returncode == 0
    }

    /// Python reports a missing `-m` module this way
    pub fn missing_module(&self, module: &str) -> bool {
        let marker = format!("No module named {}", module);
        self.stderr.contains(&marker) || self.stdout.contains(&marker)
    }
}

/// Run a process to completion, killing it if it outlives `spec.timeout`
pub async fn run_process(spec: &ProcessSpec) -> ProcessOutput {
    debug!("Running: {}", spec.display());

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .kill_on_drop(true);

    if let Some(ref cwd) = spec.cwd {
        command.current_dir(cwd);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!("Failed to spawn {}: {}", spec.program, e);
            return ProcessOutput::failed(e.to_string());
        }
    };

    if let (Some(input), Some(mut stdin)) = (spec.stdin.as_ref(), child.stdin.take()) {
        let payload = input.clone().into_bytes();
        // Writer runs beside the reader so a large payload can't deadlock on full pipes
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&payload).await {
                debug!("stdin write ended early: {}", e);
            }
        });
    }

    // Dropping the wait future drops the child, which kills it.
    match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => ProcessOutput {
            returncode: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Ok(Err(e)) => ProcessOutput::failed(e.to_string()),
        Err(_) => {
            warn!(
                "Command timed out after {}s: {}",
                spec.timeout.as_secs(),
                spec.display()
            );
            ProcessOutput::failed(format!(
                "Command timed out after {}s",
                spec.timeout.as_secs()
            ))
        }
    }
}

/// True when `program` can be found on PATH (or is an existing path)
pub fn tool_available(program: &str) -> bool {
    which::which(program).is_ok()
}
