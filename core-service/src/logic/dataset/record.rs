use super::{DatasetError, LABEL_COLUMN};
use crate::logic::features::{Feature, FeatureRow, FeatureValue};
use crate::logic::passenger::{Embarked, Passenger, Pclass, Sex, MAX_AGE};

/// One CSV row viewed through its header
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    headers: &'a [String],
    values: &'a [String],
    line: u64,
}

impl<'a> RawRecord<'a> {
    pub fn new(headers: &'a [String], values: &'a [String], line: u64) -> Self {
        Self { headers, values, line }
    }

    /// 1-based line in the source file
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.values.get(idx).map(String::as_str)
    }

    /// Strict conversion into a validated passenger
    pub fn to_passenger(&self) -> Result<Passenger, DatasetError> {
        let passenger = Passenger {
            pclass: self.pclass().map_err(|r| self.invalid(r))?,
            sex: self.sex().map_err(|r| self.invalid(r))?,
            age: self.number("age").map_err(|r| self.invalid(r))?,
            sibsp: self.count("sibsp").map_err(|r| self.invalid(r))?,
            parch: self.count("parch").map_err(|r| self.invalid(r))?,
            fare: self.number("fare").map_err(|r| self.invalid(r))?,
            embarked: self.embarked().map_err(|r| self.invalid(r))?,
        };

        passenger.check().map_err(|v| self.invalid(v.to_string()))?;
        Ok(passenger)
    }

    /// Lenient conversion into a model row, for batch scoring
    ///
    /// Blank numeric cells become NaN so the pipeline imputes them.
    /// Categorical cells must be valid and present numbers must lie in
    /// their field's domain.
    pub fn to_feature_row(&self, order: &[Feature]) -> Result<FeatureRow, DatasetError> {
        let columns = order
            .iter()
            .map(|&feature| {
                self.feature_value(feature)
                    .map(|value| (feature, value))
                    .map_err(|r| self.invalid(r))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FeatureRow::from_columns(columns))
    }

    /// Ground-truth label, `None` when the cohort has no label column
    pub fn label(&self) -> Result<Option<u8>, DatasetError> {
        let Some(raw) = self.get(LABEL_COLUMN) else {
            return Ok(None);
        };
        match raw.parse::<f64>() {
            Ok(v) if v == 0.0 => Ok(Some(0)),
            Ok(v) if v == 1.0 => Ok(Some(1)),
            _ => Err(self.invalid(format!("{} must be 0 or 1, got '{}'", LABEL_COLUMN, raw))),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> DatasetError {
        DatasetError::InvalidRow {
            line: self.line,
            reason: reason.into(),
        }
    }

    fn feature_value(&self, feature: Feature) -> Result<FeatureValue, String> {
        let value = match feature {
            Feature::Pclass => FeatureValue::Number(u8::from(self.pclass()?) as f64),
            Feature::Sex => FeatureValue::Category(self.sex()?.as_str().to_string()),
            Feature::Embarked => FeatureValue::Category(self.embarked()?.as_str().to_string()),
            Feature::Age => FeatureValue::Number(self.optional_number("age", Some(MAX_AGE))?),
            Feature::Fare => FeatureValue::Number(self.optional_number("fare", None)?),
            Feature::SibSp | Feature::Parch => {
                let n = self.optional_number(feature.name(), None)?;
                if !n.is_nan() && n.fract() != 0.0 {
                    return Err(format!("{} must be a non-negative integer, got {}", feature, n));
                }
                FeatureValue::Number(n)
            }
        };
        Ok(value)
    }

    fn pclass(&self) -> Result<Pclass, String> {
        self.whole_number("pclass")
            .and_then(|n| u8::try_from(n).map_err(|_| format!("pclass out of range: {}", n)))
            .and_then(Pclass::try_from)
    }

    fn sex(&self) -> Result<Sex, String> {
        let raw = self.required("sex")?;
        Sex::parse(raw).ok_or_else(|| format!("sex must be male or female, got '{}'", raw))
    }

    fn embarked(&self) -> Result<Embarked, String> {
        let raw = self.required("embarked")?;
        Embarked::parse(raw).ok_or_else(|| format!("embarked must be C, Q or S, got '{}'", raw))
    }

    fn required(&self, column: &str) -> Result<&'a str, String> {
        match self.get(column) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(format!("{} is missing", column)),
        }
    }

    fn number(&self, column: &str) -> Result<f64, String> {
        let raw = self.required(column)?;
        raw.parse::<f64>()
            .map_err(|_| format!("{} is not a number: '{}'", column, raw))
    }

    /// NaN when blank, otherwise a number in `[0, max]`
    fn optional_number(&self, column: &str, max: Option<f64>) -> Result<f64, String> {
        if self.get(column).map_or(true, str::is_empty) {
            return Ok(f64::NAN);
        }
        let n = self.number(column)?;
        if n.is_nan() {
            return Ok(n);
        }
        let too_big = max.map_or(!n.is_finite(), |max| n > max);
        if n < 0.0 || too_big {
            return Err(match max {
                Some(max) => format!("{} must be between 0 and {}, got {}", column, max, n),
                None => format!("{} must be non-negative and finite, got {}", column, n),
            });
        }
        Ok(n)
    }

    fn whole_number(&self, column: &str) -> Result<u64, String> {
        let n = self.number(column)?;
        if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
            Ok(n as u64)
        } else {
            Err(format!("{} must be a non-negative integer, got {}", column, n))
        }
    }

    fn count(&self, column: &str) -> Result<u32, String> {
        // whole_number already caps at u32::MAX
        self.whole_number(column).map(|n| n as u32)
    }
}
