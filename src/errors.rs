// Error taxonomy for the healing engine
//
// Only input and persistence failures are errors. Everything that happens
// inside the validate/fix loop is captured as data on the result types.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealError {
    /// Target of a file-based heal does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Backup snapshot or result write failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HealError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// User-facing message when a command needs a model but none is configured
pub fn no_provider_error() -> String {
    "No model provider configured.\n\n\
    Add a provider to ~/.mender/config.toml:\n\n\
    [[providers]]\n\
    type = \"claude\"\n\
    api_key = \"sk-ant-...\"\n\n\
    Alternatively, set an environment variable:\n\
    export ANTHROPIC_API_KEY=\"sk-ant-...\""
        .to_string()
}

/// Wrap a config parse failure with a hint about where the file lives
pub fn config_parse_error(details: &str) -> String {
    format!(
        "Failed to parse ~/.mender/config.toml\n\n{}\n\n\
        Check the file for typos, or delete it to fall back to defaults.",
        details
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_message() {
        let err = HealError::FileNotFound(PathBuf::from("/tmp/missing.py"));
        assert_eq!(err.to_string(), "File not found: /tmp/missing.py");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = HealError::io(
            "/tmp/x.py",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/x.py"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
