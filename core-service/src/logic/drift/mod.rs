//! Drift Module - Feature distribution shift between two cohorts
//!
//! Purpose: flag features whose distribution in a newer cohort differs
//! from the baseline the model was trained on.
//!
//! How it works:
//! 1. Code every feature column numerically (`encode.rs`)
//! 2. Drop missing cells per cohort, per feature
//! 3. Run a two-sample KS test per feature (`ks.rs`)
//! 4. Rank by p-value, strongest evidence of drift first

pub mod encode;
pub mod ks;


use std::cmp::Ordering;

use serde::Serialize;

use crate::logic::dataset::Cohort;
use crate::logic::features::Feature;
use encode::encode_column;
use ks::{ks_2samp, KsResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{cohort} cohort is missing required column(s): {}", .columns.join(", "))]
pub struct DriftError {
    pub cohort: &'static str,
    pub columns: Vec<String>,
}

/// Test outcome for one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftRow {
    pub feature: Feature,
    pub statistic: f64,
    pub p_value: f64,
    pub baseline_count: usize,
    pub candidate_count: usize,
}

impl DriftRow {
    /// False when either cohort had no usable values
    pub fn is_defined(&self) -> bool {
        !self.p_value.is_nan()
    }

    pub fn is_drifting(&self, alpha: f64) -> bool {
        self.is_defined() && self.p_value < alpha
    }
}

/// Rows sorted ascending by p-value, undefined rows last
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    pub rows: Vec<DriftRow>,
}

impl DriftReport {
    pub fn get(&self, feature: Feature) -> Option<&DriftRow> {
        self.rows.iter().find(|row| row.feature == feature)
    }

    pub fn drifting(&self, alpha: f64) -> impl Iterator<Item = &DriftRow> {
        self.rows.iter().filter(move |row| row.is_drifting(alpha))
    }

    pub fn undefined(&self) -> impl Iterator<Item = &DriftRow> {
        self.rows.iter().filter(|row| !row.is_defined())
    }
}

/// Compare every feature's distribution between `baseline` and `candidate`
pub fn compare(baseline: &Cohort, candidate: &Cohort) -> Result<DriftReport, DriftError> {
    for (name, cohort) in [("baseline", baseline), ("candidate", candidate)] {
        let missing = cohort.missing_feature_columns();
        if !missing.is_empty() {
            return Err(DriftError {
                cohort: name,
                columns: missing,
            });
        }
    }

    let mut rows: Vec<DriftRow> = Feature::ALL
        .iter()
        .map(|&feature| {
            let a = column_values(baseline, feature);
            let b = column_values(candidate, feature);
            let KsResult { statistic, p_value } = ks_2samp(&a, &b);
            DriftRow {
                feature,
                statistic,
                p_value,
                baseline_count: a.len(),
                candidate_count: b.len(),
            }
        })
        .collect();

    // Stable: ties keep canonical feature order
    rows.sort_by(|x, y| by_p_value(x.p_value, y.p_value));

    let report = DriftReport { rows };
    if let Some(top) = report.rows.first().filter(|row| row.is_defined()) {
        log::debug!(
            "drift: strongest shift in '{}' (D={:.4}, p={:.3e})",
            top.feature,
            top.statistic,
            top.p_value
        );
    }
    Ok(report)
}

fn column_values(cohort: &Cohort, feature: Feature) -> Vec<f64> {
    cohort
        .column(feature.name())
        .map(|cells| encode_column(feature, cells))
        .unwrap_or_default()
}

/// Ascending, NaN after every number
fn by_p_value(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}
