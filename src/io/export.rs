//! CSV and JSON export for simulation output.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::SimError;
use crate::sim::kpi::KpiSummary;
use crate::sim::types::TimeStepRecord;

/// Column header for CSV telemetry export.
const HEADER: &str = "timestamp,load_kw,pv_kw,direct_kw,soc_kwh,import_kw,export_kw,\
                      charge_kw,discharge_kw,curtail_kw,price";

/// Exports step records to a CSV file at the given path.
///
/// Writes a header row followed by one data row per step. Powers, energies
/// and SOC carry 3 decimals, price 2. Output is deterministic for identical
/// inputs.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be created and
/// [`SimError::Csv`] if writing fails.
pub fn export_csv(records: &[TimeStepRecord], path: &Path) -> Result<(), SimError> {
    let file = File::create(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(records, io::BufWriter::new(file))
}

/// Writes step records as CSV to any writer.
///
/// # Errors
///
/// Returns [`SimError::Csv`] if writing fails.
pub fn write_csv(records: &[TimeStepRecord], writer: impl Write) -> Result<(), SimError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.timestamp.to_rfc3339(),
            format!("{:.3}", r.load_kw),
            format!("{:.3}", r.pv_kw),
            format!("{:.3}", r.direct_kw),
            format!("{:.3}", r.soc_kwh),
            format!("{:.3}", r.import_kw),
            format!("{:.3}", r.export_kw),
            format!("{:.3}", r.charge_kw),
            format!("{:.3}", r.discharge_kw),
            format!("{:.3}", r.curtail_kw),
            format!("{:.2}", r.price),
        ])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the rounded KPI summary as pretty-printed JSON to a file.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be created or written and
/// [`SimError::Json`] if serialization fails.
pub fn export_kpi_json(kpi: &KpiSummary, path: &Path) -> Result<(), SimError> {
    let io_err = |source| SimError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut buf = io::BufWriter::new(file);
    write_kpi_json(kpi, &mut buf)?;
    buf.flush().map_err(io_err)
}

/// Writes the rounded KPI summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`SimError::Json`] if serialization or writing fails.
pub fn write_kpi_json(kpi: &KpiSummary, writer: impl Write) -> Result<(), SimError> {
    serde_json::to_writer_pretty(writer, &kpi.rounded())?;
    Ok(())
}
