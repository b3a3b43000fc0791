//! Configuration module

use std::env;
use std::path::PathBuf;

use titanic_core::constants;
use titanic_core::DecisionThreshold;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Serialized model bundle
    pub model_path: PathBuf,

    /// Threshold used when the bundle does not carry one
    pub default_threshold: DecisionThreshold,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default_threshold = DecisionThreshold::new(constants::get_default_threshold())
            .unwrap_or_else(|e| {
                tracing::warn!("Ignoring THRESHOLD: {}", e);
                DecisionThreshold::default()
            });

        Self {
            model_path: PathBuf::from(constants::get_model_path()),

            default_threshold,

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
        }
    }
}
