use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{Cohort, DatasetError};

/// Read a passenger CSV from disk
///
/// The seven feature columns are required; `survived` and any extra
/// columns are optional.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Cohort, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let cohort = read_csv(file)?;
    log::info!(
        "Loaded {} rows from {}{}",
        cohort.len(),
        path.display(),
        if cohort.has_labels() { " (labelled)" } else { "" }
    );
    Ok(cohort)
}

/// Read a passenger CSV from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<Cohort, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cohort = Cohort::new(headers);

    let missing = cohort.missing_feature_columns();
    if !missing.is_empty() {
        return Err(DatasetError::MissingColumns(missing));
    }

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        cohort.push_row_at(record.iter().map(str::to_string).collect(), line);
    }

    Ok(cohort)
}
