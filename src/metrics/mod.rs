// Metrics module
// Daily JSONL log of healing runs

mod logger;
mod types;

pub use logger::HealingLogger;
pub use types::{HealingRecord, HealingSummary};
