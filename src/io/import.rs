//! CSV import of measured power profiles.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::SimError;
use crate::profiles::MeasuredProfile;

/// Loads a measured profile from a CSV file.
///
/// See [`read_profile_csv`] for the accepted layout.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be opened, otherwise as
/// [`read_profile_csv`].
pub fn load_profile_csv(path: &Path, name: &'static str) -> Result<MeasuredProfile, SimError> {
    let file = File::open(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_profile_csv(file, name)
}

/// Reads a power series from CSV.
///
/// The first row is a header. Each following row holds one step; the power
/// in kW is taken from the last column, so both a single `kw` column and a
/// `timestamp,kw` layout are accepted. Rows are used in file order.
///
/// # Errors
///
/// Returns [`SimError::Csv`] for malformed CSV and
/// [`SimError::InvalidParameter`] for a value that is not a finite number.
pub fn read_profile_csv(reader: impl Read, name: &'static str) -> Result<MeasuredProfile, SimError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let Some(raw) = record.iter().last() else {
            continue;
        };
        let kw: f64 = raw.parse().map_err(|_| {
            SimError::invalid(
                format!("{name}[{row}]"),
                format!("expected a number in kW, got \"{raw}\""),
            )
        })?;
        if !kw.is_finite() {
            return Err(SimError::invalid(format!("{name}[{row}]"), "must be finite"));
        }
        samples.push(kw);
    }

    Ok(MeasuredProfile::new(name, samples))
}
