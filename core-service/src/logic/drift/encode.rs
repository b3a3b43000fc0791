//! Numeric coding of passenger columns for distribution tests
//!
//! Only used for monitoring; the model itself sees raw categories.

use crate::logic::features::Feature;
use crate::logic::passenger::{Embarked, Sex};

/// Numeric code of one raw cell, `None` when missing or unparseable
pub fn encode_cell(feature: Feature, raw: &str) -> Option<f64> {
    match feature {
        Feature::Sex => Sex::parse(raw).map(|sex| match sex {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }),
        Feature::Embarked => Embarked::parse(raw).map(|port| match port {
            Embarked::C => 0.0,
            Embarked::Q => 1.0,
            Embarked::S => 2.0,
        }),
        _ => raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
    }
}

/// Non-missing numeric values of a column
pub fn encode_column<'a>(feature: Feature, cells: impl Iterator<Item = &'a str>) -> Vec<f64> {
    cells.filter_map(|cell| encode_cell(feature, cell)).collect()
}
