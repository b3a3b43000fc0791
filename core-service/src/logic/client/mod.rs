//! Smoke Client
//!
//! HTTP client that exercises a running prediction service: wakes it up
//! through `/healthz`, posts the canned passengers to `/predict` and keeps
//! every exchange as evidence.

pub mod retry;

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logic::passenger::{Embarked, Passenger, Pclass, Sex};
pub use retry::RetryPolicy;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(20);
const PREDICT_TIMEOUT: Duration = Duration::from_secs(30);
const PAUSE_BETWEEN_CALLS: Duration = Duration::from_millis(200);

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{url} still answering {status} after {retries} retries")]
    RetriesExhausted {
        url: String,
        status: u16,
        retries: u32,
    },
    #[error("cannot write results: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ============================================================================
// REQUEST / RESULT TYPES
// ============================================================================

/// Query string of a `/predict` call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PredictParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// One canned `/predict` call
#[derive(Debug, Clone)]
pub struct SmokeCase {
    pub name: &'static str,
    pub passenger: Passenger,
    pub params: PredictParams,
}

/// Evidence of one call; `error` is set when no response arrived
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmokeResult {
    pub name: String,
    pub url: String,
    pub sent_json: Passenger,
    pub sent_params: PredictParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SmokeResult {
    pub fn is_success(&self) -> bool {
        self.status_code.map_or(false, |code| (200..300).contains(&code))
    }
}

/// The three passengers every deployment is checked against
pub fn canned_cases() -> Vec<SmokeCase> {
    vec![
        SmokeCase {
            name: "case 1 - first-class woman",
            passenger: Passenger {
                pclass: Pclass::First,
                sex: Sex::Female,
                age: 22.0,
                sibsp: 0,
                parch: 1,
                fare: 80.0,
                embarked: Embarked::C,
            },
            params: PredictParams::default(),
        },
        SmokeCase {
            name: "case 2 - third-class man (threshold 0.60)",
            passenger: Passenger {
                pclass: Pclass::Third,
                sex: Sex::Male,
                age: 35.0,
                sibsp: 0,
                parch: 0,
                fare: 8.05,
                embarked: Embarked::S,
            },
            params: PredictParams { confidence: Some(0.60) },
        },
        SmokeCase {
            name: "case 3 - second-class woman (threshold 0.40)",
            passenger: Passenger {
                pclass: Pclass::Second,
                sex: Sex::Female,
                age: 28.0,
                sibsp: 1,
                parch: 0,
                fare: 26.0,
                embarked: Embarked::Q,
            },
            params: PredictParams { confidence: Some(0.40) },
        },
    ]
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct SmokeClient {
    base_url: String,
    policy: RetryPolicy,
    http_client: reqwest::Client,
}

impl SmokeClient {
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            base_url,
            policy,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /healthz, returns the status code and body
    pub async fn health_check(&self) -> Result<(u16, Value), ClientError> {
        let url = format!("{}/healthz", self.base_url);
        let response = self
            .send_with_retry(&url, || self.http_client.get(&url).timeout(HEALTH_TIMEOUT))
            .await?;

        let status = response.status().as_u16();
        Ok((status, read_body(response).await?))
    }

    /// POST one case to /predict
    pub async fn predict(&self, case: &SmokeCase) -> SmokeResult {
        let url = format!("{}/predict", self.base_url);
        let mut result = SmokeResult {
            name: case.name.to_string(),
            url: url.clone(),
            sent_json: case.passenger.clone(),
            sent_params: case.params,
            status_code: None,
            response: None,
            error: None,
        };

        let sent = self
            .send_with_retry(&url, || {
                self.http_client
                    .post(&url)
                    .query(&case.params)
                    .json(&case.passenger)
                    .timeout(PREDICT_TIMEOUT)
            })
            .await;

        match sent {
            Ok(response) => {
                result.status_code = Some(response.status().as_u16());
                match read_body(response).await {
                    Ok(body) => result.response = Some(body),
                    Err(e) => result.error = Some(e.to_string()),
                }
            }
            Err(e) => result.error = Some(e.to_string()),
        }
        result
    }

    /// Health check, then every canned case with a short pause in between
    ///
    /// Failures are recorded in the results, never returned.
    pub async fn run(&self) -> Vec<SmokeResult> {
        log::info!("Smoke run against {}", self.base_url);

        match self.health_check().await {
            Ok((status, body)) => log::info!("[healthz] {} {}", status, body),
            Err(e) => log::warn!("[healthz] {}", e),
        }

        let mut results = Vec::new();
        for (i, case) in canned_cases().iter().enumerate() {
            let result = self.predict(case).await;
            match (&result.status_code, &result.error) {
                (Some(status), _) => log::info!(
                    "[predict #{}] {}: {} -> {}",
                    i + 1,
                    case.name,
                    status,
                    result.response.as_ref().map(Value::to_string).unwrap_or_default()
                ),
                (None, Some(e)) => log::warn!("[predict #{}] {}: {}", i + 1, case.name, e),
                (None, None) => {}
            }
            results.push(result);
            tokio::time::sleep(PAUSE_BETWEEN_CALLS).await;
        }
        results
    }

    /// Send, retrying network errors and retryable statuses
    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<Response, ClientError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retry = 0;
        loop {
            match build().send().await {
                Ok(response) if self.policy.is_retryable(response.status()) => {
                    if retry >= self.policy.max_retries {
                        return Err(ClientError::RetriesExhausted {
                            url: url.to_string(),
                            status: response.status().as_u16(),
                            retries: retry,
                        });
                    }
                    log::debug!("{} answered {}, retrying", url, response.status());
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    if retry >= self.policy.max_retries {
                        return Err(ClientError::Network(e));
                    }
                    log::debug!("{} unreachable ({}), retrying", url, e);
                }
            }

            retry += 1;
            tokio::time::sleep(self.policy.backoff(retry)).await;
        }
    }
}

/// JSON body, or `{"raw_text": ...}` when the body is not JSON
async fn read_body(response: Response) -> Result<Value, ClientError> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "raw_text": text })))
}

/// Write results as pretty JSON, creating parent directories
pub fn write_results(path: impl AsRef<Path>, results: &[SmokeResult]) -> Result<(), ClientError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(results)?)?;
    log::info!("Smoke results saved to {}", path.display());
    Ok(())
}
