// Project-wide constants
//
// Import via `use crate::config::constants::*;`.

/// Directory under $HOME holding config, backups and metrics
pub const APP_DIR_NAME: &str = ".mender";

/// Config file name inside the app directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Suffix appended to every backup snapshot
pub const BACKUP_SUFFIX: &str = "bak";

/// Timestamp format embedded in backup names; sorts lexicographically
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Default interpreter for Python-based checkers
pub const DEFAULT_PYTHON: &str = "python3";

/// Default maximum tokens for a fix request
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
