// Mender - validate source files and repair them with a language model
// Library exports

pub mod cli;
pub mod config;
pub mod errors;
pub mod healing;
pub mod logging;
pub mod metrics;
pub mod providers;
pub mod validation;

pub use errors::HealError;
pub use healing::{AutoHealer, HealRequest, HealingConfig, HealingResult};
