// Backup ledger
// Timestamped whole-file snapshots taken before a heal touches a file

use chrono::{Local, NaiveDateTime};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::constants::{BACKUP_SUFFIX, BACKUP_TIMESTAMP_FORMAT};
use crate::errors::HealError;

/// Flat directory of `<basename>.<YYYYMMDD_HHMMSS>.bak` files
///
/// Backups are keyed by basename only, so two files with the same name in
/// different directories share a history.
#[derive(Debug, Clone)]
pub struct BackupLedger {
    root: PathBuf,
}

impl BackupLedger {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` as the newest backup of `path`
    pub fn snapshot(&self, path: &Path, content: &str) -> Result<PathBuf, HealError> {
        fs::create_dir_all(&self.root).map_err(|e| HealError::io(&self.root, e))?;

        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup_path = self.root.join(format!(
            "{}.{}.{}",
            basename(path),
            timestamp,
            BACKUP_SUFFIX
        ));

        fs::write(&backup_path, content).map_err(|e| HealError::io(&backup_path, e))?;
        info!("Created backup: {}", backup_path.display());
        Ok(backup_path)
    }

    /// Copy the newest backup of `path` over it. Returns false when none exists.
    pub fn restore(&self, path: &Path) -> Result<bool, HealError> {
        let Some(latest) = self.list(Some(path))?.into_iter().next() else {
            debug!("No backups for {}", path.display());
            return Ok(false);
        };

        let content = fs::read(&latest).map_err(|e| HealError::io(&latest, e))?;
        fs::write(path, content).map_err(|e| HealError::io(path, e))?;
        info!("Restored {} from {}", path.display(), latest.display());
        Ok(true)
    }

    /// Backups newest first, for one file or for everything in the ledger
    pub fn list(&self, path: Option<&Path>) -> Result<Vec<PathBuf>, HealError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HealError::io(&self.root, e)),
        };

        let prefix = path.map(|p| format!("{}.", basename(p)));
        let suffix = format!(".{}", BACKUP_SUFFIX);

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| HealError::io(&self.root, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(stem) = name.strip_suffix(suffix.as_str()) else {
                continue;
            };
            let stamp = match &prefix {
                Some(prefix) => stem.strip_prefix(prefix.as_str()),
                None => stem.rsplit_once('.').map(|(_, stamp)| stamp),
            };
            if stamp.is_some_and(is_timestamp) {
                backups.push(entry.path());
            }
        }

        // Timestamps sort lexicographically; newest first
        backups.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(backups)
    }
}

/// The part between `<basename>.` and `.bak` must be a snapshot timestamp,
/// so `app.py.orig.<ts>.bak` is not taken for a backup of `app.py`
fn is_timestamp(stamp: &str) -> bool {
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).is_ok()
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
