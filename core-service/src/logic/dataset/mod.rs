//! Dataset Module - Passenger cohorts for offline analysis
//!
//! A cohort is a header plus raw text rows, read from CSV. Values stay as
//! text so each consumer applies its own coercion: the drift comparator
//! treats unparseable cells as missing, the evaluator rejects them.

pub mod loader;
pub mod record;


use std::path::PathBuf;

pub use loader::{load_csv, read_csv};
pub use record::RawRecord;

use crate::logic::features::FEATURE_LAYOUT;
use crate::logic::features::layout::missing_columns;
use crate::logic::passenger::Passenger;

/// Optional ground-truth column
pub const LABEL_COLUMN: &str = "survived";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("cannot open dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// Header + rows of raw cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cohort {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    lines: Vec<u64>,
}

impl Cohort {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Cohort with the canonical feature columns, one row per passenger
    pub fn from_passengers(passengers: &[Passenger]) -> Self {
        let mut cohort = Self::new(FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect());
        for p in passengers {
            cohort.push_row(vec![
                u8::from(p.pclass).to_string(),
                p.sex.as_str().to_string(),
                p.age.to_string(),
                p.sibsp.to_string(),
                p.parch.to_string(),
                p.fare.to_string(),
                p.embarked.as_str().to_string(),
            ]);
        }
        cohort
    }

    /// Append a row; line numbers continue after the header
    pub fn push_row(&mut self, values: Vec<String>) {
        let line = self.lines.last().copied().unwrap_or(1) + 1;
        self.push_row_at(values, line);
    }

    pub(crate) fn push_row_at(&mut self, values: Vec<String>, line: u64) {
        self.rows.push(values);
        self.lines.push(line);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn has_labels(&self) -> bool {
        self.has_column(LABEL_COLUMN)
    }

    /// Raw cells of one column, `None` if the column does not exist
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(move |row| row.get(idx).map(String::as_str).unwrap_or("")),
        )
    }

    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> {
        self.rows
            .iter()
            .zip(&self.lines)
            .map(move |(values, &line)| RawRecord::new(&self.headers, values, line))
    }

    /// Feature columns absent from the header
    pub fn missing_feature_columns(&self) -> Vec<String> {
        missing_columns(&self.headers, FEATURE_LAYOUT)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}
