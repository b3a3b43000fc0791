//! Passenger record - the unit of prediction input
//!
//! Enumerated fields are closed Rust enums, so an unknown class, sex or port
//! never deserializes. Numeric ranges are checked by [`Passenger::check`]
//! before anything reaches a classifier.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Ticket class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Pclass {
    First = 1,
    Second = 2,
    Third = 3,
}

impl TryFrom<u8> for Pclass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Pclass::First),
            2 => Ok(Pclass::Second),
            3 => Ok(Pclass::Third),
            other => Err(format!("pclass must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<Pclass> for u8 {
    fn from(class: Pclass) -> Self {
        class as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// Port of embarkation: Cherbourg, Queenstown, Southampton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Embarked {
    C,
    Q,
    S,
}

impl Embarked {
    pub fn as_str(self) -> &'static str {
        match self {
            Embarked::C => "C",
            Embarked::Q => "Q",
            Embarked::S => "S",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "C" => Some(Embarked::C),
            "Q" => Some(Embarked::Q),
            "S" => Some(Embarked::S),
            _ => None,
        }
    }
}

/// Inclusive upper bound on `age`, mirrored in the validator attribute
pub const MAX_AGE: f64 = 120.0;

/// A single passenger as sent by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Passenger {
    pub pclass: Pclass,
    pub sex: Sex,
    #[validate(range(min = 0.0, max = 120.0, message = "must be between 0 and 120"))]
    pub age: f64,
    pub sibsp: u32,
    pub parch: u32,
    #[validate(range(min = 0.0, message = "must be non-negative"))]
    pub fare: f64,
    pub embarked: Embarked,
}

/// Field-domain violation, names every offending field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", format_violations(.violations))]
pub struct SchemaViolation {
    pub violations: Vec<(String, String)>,
}

impl SchemaViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { violations: vec![(field.into(), reason.into())] }
    }

    /// Offending field names
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|(field, _)| field.as_str())
    }
}

fn format_violations(violations: &[(String, String)]) -> String {
    violations
        .iter()
        .map(|(field, reason)| format!("{}: {}", field, reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ValidationErrors> for SchemaViolation {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let reason = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    (field.to_string(), reason)
                })
            })
            .collect();
        violations.sort();
        Self { violations }
    }
}

impl Passenger {
    /// Check every field against its declared domain
    pub fn check(&self) -> Result<(), SchemaViolation> {
        // NaN slips through range comparisons
        let mut violations = Vec::new();
        if !self.age.is_finite() {
            violations.push(("age".to_string(), "must be a finite number".to_string()));
        }
        if !self.fare.is_finite() {
            violations.push(("fare".to_string(), "must be a finite number".to_string()));
        }
        if !violations.is_empty() {
            return Err(SchemaViolation { violations });
        }

        self.validate().map_err(SchemaViolation::from)
    }
}
