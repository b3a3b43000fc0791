//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment.

/// Default path of the serialized model bundle
pub const DEFAULT_MODEL_PATH: &str = "model/logistic_titanic_pipeline.json";

/// Decision threshold used when neither the bundle nor the environment sets one
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default service URL for the smoke client
///
/// For development: http://localhost:8000
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default location of the smoke client evidence file
pub const DEFAULT_SMOKE_OUTPUT: &str = "docs/client_results.json";

/// Significance level used to flag drifting features
pub const DEFAULT_DRIFT_ALPHA: f64 = 0.05;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model bundle path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get default decision threshold from environment or use default
pub fn get_default_threshold() -> f64 {
    parse_threshold(std::env::var("THRESHOLD").ok().as_deref())
}

/// Unset or unparsable values fall back to `DEFAULT_THRESHOLD`
pub fn parse_threshold(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_THRESHOLD;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            log::warn!(
                "THRESHOLD '{}' is not a number ({}), using {}",
                raw,
                e,
                DEFAULT_THRESHOLD
            );
            DEFAULT_THRESHOLD
        }
    }
}

/// Get smoke client base URL from environment or use default
pub fn get_base_url() -> String {
    std::env::var("BASE_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}
