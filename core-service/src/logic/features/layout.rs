//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! The canonical order is the column order the training pipeline was fitted
//! with. A bundle may reorder or subset it but never add to it.

use std::fmt;
use std::str::FromStr;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in canonical order
pub const FEATURE_LAYOUT: &[&str] = &[
    "pclass",   // 0: Ticket class (1, 2, 3)
    "sex",      // 1: male / female
    "age",      // 2: Age in years
    "sibsp",    // 3: Siblings / spouses aboard
    "parch",    // 4: Parents / children aboard
    "fare",     // 5: Fare paid
    "embarked", // 6: Port of embarkation (C, Q, S)
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 7;

/// One passenger field usable as a model input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Feature {
    Pclass,
    Sex,
    Age,
    SibSp,
    Parch,
    Fare,
    Embarked,
}

impl Feature {
    /// All features in canonical order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Pclass,
        Feature::Sex,
        Feature::Age,
        Feature::SibSp,
        Feature::Parch,
        Feature::Fare,
        Feature::Embarked,
    ];

    pub fn name(self) -> &'static str {
        FEATURE_LAYOUT[self.index()]
    }

    /// Position in the canonical layout
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature '{0}' (expected one of: {layout})", layout = FEATURE_LAYOUT.join(", "))]
pub struct UnknownFeature(pub String);

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        feature_index(s)
            .map(|i| Feature::ALL[i])
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

impl TryFrom<String> for Feature {
    type Error = UnknownFeature;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Feature> for String {
    fn from(feature: Feature) -> Self {
        feature.name().to_string()
    }
}

/// The canonical feature order as an owned list
pub fn default_feature_order() -> Vec<Feature> {
    Feature::ALL.to_vec()
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of a feature order
/// Used to make bundle/layout mismatches visible in logs
pub fn compute_layout_hash(features: &[Feature]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for feature in features {
        hasher.update(feature.name().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Hash of the canonical layout
pub fn layout_hash() -> u32 {
    compute_layout_hash(&Feature::ALL)
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Names of `required` columns absent from `headers`, in the order given
pub fn missing_columns<S: AsRef<str>>(headers: &[S], required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !headers.iter().any(|h| h.as_ref() == **name))
        .map(|name| name.to_string())
        .collect()
}
