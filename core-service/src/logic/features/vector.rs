//! Feature Row - the single-row model input
//!
//! A row is the passenger's fields laid out in the order the bundle expects.
//! Values keep their raw type (number or category); encoding into a numeric
//! vector is the classifier's business.

use std::borrow::Cow;

use serde::Serialize;

use super::layout::Feature;
use crate::logic::passenger::Passenger;

/// Raw value of one input column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    /// Numeric view; categories that parse as numbers are accepted
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Category(s) => s.trim().parse().ok(),
        }
    }

    /// Category view; integral numbers print without a fractional part
    pub fn as_category(&self) -> Cow<'_, str> {
        match self {
            FeatureValue::Category(s) => Cow::Borrowed(s.as_str()),
            FeatureValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Cow::Owned(format!("{}", *n as i64))
            }
            FeatureValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

/// Ordered (feature, value) pairs for one passenger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    columns: Vec<(Feature, FeatureValue)>,
}

impl FeatureRow {
    /// Lay out `passenger` in exactly the given feature order
    pub fn assemble(passenger: &Passenger, order: &[Feature]) -> Self {
        let columns = order
            .iter()
            .map(|&feature| (feature, extract(passenger, feature)))
            .collect();
        Self { columns }
    }

    /// Row from already-extracted values, kept in the given order
    pub fn from_columns(columns: Vec<(Feature, FeatureValue)>) -> Self {
        Self { columns }
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(feature, _)| feature.name() == name)
            .map(|(_, value)| value)
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.columns.iter().map(|(feature, _)| *feature)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn extract(passenger: &Passenger, feature: Feature) -> FeatureValue {
    match feature {
        Feature::Pclass => FeatureValue::Number(u8::from(passenger.pclass) as f64),
        Feature::Sex => FeatureValue::Category(passenger.sex.as_str().to_string()),
        Feature::Age => FeatureValue::Number(passenger.age),
        Feature::SibSp => FeatureValue::Number(passenger.sibsp as f64),
        Feature::Parch => FeatureValue::Number(passenger.parch as f64),
        Feature::Fare => FeatureValue::Number(passenger.fare),
        Feature::Embarked => FeatureValue::Category(passenger.embarked.as_str().to_string()),
    }
}
