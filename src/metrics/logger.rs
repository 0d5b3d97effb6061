// Healing run logger

use anyhow::{Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use super::types::{HealingRecord, HealingSummary};

pub struct HealingLogger {
    metrics_dir: PathBuf,
}

impl HealingLogger {
    pub fn new(metrics_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&metrics_dir).with_context(|| {
            format!(
                "Failed to create metrics directory: {}",
                metrics_dir.display()
            )
        })?;

        Ok(Self { metrics_dir })
    }

    /// Today's log name, `YYYY-MM-DD` in UTC
    pub fn today() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    /// Append a record to today's JSONL file
    pub fn log(&self, record: &HealingRecord) -> Result<()> {
        let log_file = self.metrics_dir.join(format!("{}.jsonl", Self::today()));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("Failed to open healing log: {}", log_file.display()))?;

        let json = serde_json::to_string(record).context("Failed to serialize healing record")?;

        writeln!(file, "{}", json).context("Failed to write healing record")?;

        Ok(())
    }

    /// Hash code for the log (SHA256)
    pub fn hash_code(code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Read records for a specific date
    pub fn read_records(&self, date: &str) -> Result<Vec<HealingRecord>> {
        let log_file = self.metrics_dir.join(format!("{}.jsonl", date));

        if !log_file.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&log_file)
            .with_context(|| format!("Failed to read healing log: {}", log_file.display()))?;

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to parse healing log: {}", log_file.display()))
    }

    pub fn summary(&self, date: &str) -> Result<HealingSummary> {
        let records = self.read_records(date)?;
        if records.is_empty() {
            return Ok(HealingSummary::default());
        }

        let total = records.len();
        let successful = records.iter().filter(|r| r.success).count();
        let attempts: usize = records.iter().map(|r| r.attempts).sum();
        let duration: u64 = records.iter().map(|r| r.duration_ms).sum();

        let mut language_counts: HashMap<String, usize> = HashMap::new();
        for record in &records {
            *language_counts.entry(record.language.clone()).or_insert(0) += 1;
        }
        let mut top_languages: Vec<(String, usize)> = language_counts.into_iter().collect();
        top_languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_languages.truncate(3);

        Ok(HealingSummary {
            total,
            successful,
            failed: total - successful,
            avg_attempts: attempts as f64 / total as f64,
            avg_duration_ms: duration / total as u64,
            total_errors_fixed: records.iter().map(|r| r.errors_fixed).sum(),
            top_languages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(language: &str, success: bool, attempts: usize, duration_ms: u64) -> HealingRecord {
        HealingRecord {
            timestamp: Utc::now(),
            code_hash: HealingLogger::hash_code(language),
            language: language.to_string(),
            file: None,
            success,
            attempts,
            errors_fixed: if success { 1 } else { 0 },
            errors_remaining: if success { 0 } else { 2 },
            duration_ms,
        }
    }

    #[test]
    fn test_hash_code() {
        let hash1 = HealingLogger::hash_code("def f(): pass");
        let hash2 = HealingLogger::hash_code("def f(): pass");
        let hash3 = HealingLogger::hash_code("def g(): pass");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_log_and_summarize_today() {
        let dir = tempfile::tempdir().unwrap();
        let logger = HealingLogger::new(dir.path().join("metrics")).unwrap();

        logger.log(&record("python", true, 1, 100)).unwrap();
        logger.log(&record("python", false, 3, 300)).unwrap();
        logger.log(&record("rust", true, 2, 200)).unwrap();

        let today = HealingLogger::today();
        assert_eq!(logger.read_records(&today).unwrap().len(), 3);

        let summary = logger.summary(&today).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert!((summary.avg_attempts - 2.0).abs() < f64::EPSILON);
        assert_eq!(summary.avg_duration_ms, 200);
        assert_eq!(summary.total_errors_fixed, 2);
        assert_eq!(summary.top_languages[0], ("python".to_string(), 2));
    }

    #[test]
    fn test_missing_date_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let logger = HealingLogger::new(dir.path().to_path_buf()).unwrap();
        let summary = logger.summary("1999-01-01").unwrap();
        assert_eq!(summary, HealingSummary::default());
        assert_eq!(summary.success_rate(), 0.0);
    }
}
