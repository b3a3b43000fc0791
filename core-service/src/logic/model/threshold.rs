//! Decision Threshold
//!
//! Cutoff turning a positive-class probability into a label.
//! Always finite and inside [0, 1].

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_THRESHOLD;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("threshold must be a number in [0, 1], got {0}")]
pub struct ThresholdError(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DecisionThreshold(f64);

impl DecisionThreshold {
    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ThresholdError(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Request override wins over the configured value
    pub fn resolve(self, override_threshold: Option<DecisionThreshold>) -> DecisionThreshold {
        override_threshold.unwrap_or(self)
    }

    /// 1 iff probability >= threshold, no rounding
    pub fn label(self, probability: f64) -> u8 {
        u8::from(probability >= self.0)
    }
}

impl Default for DecisionThreshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<f64> for DecisionThreshold {
    type Error = ThresholdError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DecisionThreshold> for f64 {
    fn from(threshold: DecisionThreshold) -> Self {
        threshold.0
    }
}
