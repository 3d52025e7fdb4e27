//! Export layer: writes finished report entries to disk.
//!
//! Two formats:
//!
//! - `csv`: the report columns only, revenue fixed to three decimals.
//! - `xlsx`: a `Jobs` sheet with every fetched job and a `Report` sheet with
//!   the report columns, revenue as a plain number.
//!
//! Entries are sorted by run key before writing so the same jobs always
//! produce the same file.

use crate::error::ExportError;
use crate::types::{Job, ReportEntry};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const REPORT_COLUMNS: [&str; 6] = [
    "run_number",
    "num_orders_delivered",
    "num_parts_delivered",
    "num_orders_picked_up",
    "num_parts_picked_up",
    "freight_revenue",
];

pub const JOB_COLUMNS: [&str; 8] = [
    "id",
    "status",
    "date",
    "type",
    "items_count",
    "job_price",
    "do_number",
    "run_number",
];

const JOBS_SHEET: &str = "Jobs";
const REPORT_SHEET: &str = "Report";

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// Content type used when the file is attached to an email.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Entries ordered by run key.
pub fn sorted(entries: &[ReportEntry]) -> Vec<&ReportEntry> {
    let mut sorted: Vec<&ReportEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.run_key.cmp(&b.run_key));
    sorted
}

/// Write `<dir>/<stem>.<ext>` in `format` and return its path.
pub fn export(
    format: ExportFormat,
    jobs: &[Job],
    entries: &[ReportEntry],
    dir: &Path,
    stem: &str,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(format!("{stem}.{}", format.extension()));
    match format {
        ExportFormat::Csv => export_csv(entries, &path)?,
        ExportFormat::Xlsx => export_xlsx(jobs, entries, &path)?,
    }

    tracing::info!(path = %path.display(), format = %format, runs = entries.len(), "report written");
    Ok(path)
}

pub fn export_csv(entries: &[ReportEntry], path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(entries, file)
}

/// Header row, then one row per entry in run key order.
pub fn write_csv<W: std::io::Write>(entries: &[ReportEntry], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(REPORT_COLUMNS)?;
    for entry in sorted(entries) {
        csv.write_record([
            entry.run_key.clone(),
            entry.orders_delivered.to_string(),
            entry.parts_delivered.to_string(),
            entry.orders_picked_up.to_string(),
            entry.parts_picked_up.to_string(),
            format!("{:.3}", entry.freight_revenue.round_dp(3)),
        ])?;
    }

    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn export_xlsx(jobs: &[Job], entries: &[ReportEntry], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(JOBS_SHEET)?;
    write_jobs_sheet(sheet, jobs)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name(REPORT_SHEET)?;
    write_report_sheet(sheet, entries)?;

    workbook.save(path)?;
    Ok(())
}

fn write_header(sheet: &mut Worksheet, columns: &[&str]) -> Result<(), XlsxError> {
    for (col, name) in columns.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    Ok(())
}

fn write_jobs_sheet(sheet: &mut Worksheet, jobs: &[Job]) -> Result<(), XlsxError> {
    write_header(sheet, &JOB_COLUMNS)?;
    for (i, job) in jobs.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &job.id)?;
        sheet.write_string(row, 1, &job.status)?;
        sheet.write_string(row, 2, &job.date)?;
        sheet.write_string(row, 3, &job.job_type)?;
        sheet.write_number(row, 4, job.item_count)?;
        sheet.write_string(row, 5, &job.job_price)?;
        sheet.write_string(row, 6, &job.do_number)?;
        sheet.write_string(row, 7, &job.run_identifier)?;
    }
    Ok(())
}

fn write_report_sheet(sheet: &mut Worksheet, entries: &[ReportEntry]) -> Result<(), XlsxError> {
    write_header(sheet, &REPORT_COLUMNS)?;
    for (i, entry) in sorted(entries).into_iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &entry.run_key)?;
        sheet.write_number(row, 1, entry.orders_delivered as f64)?;
        sheet.write_number(row, 2, entry.parts_delivered as f64)?;
        sheet.write_number(row, 3, entry.orders_picked_up as f64)?;
        sheet.write_number(row, 4, entry.parts_picked_up as f64)?;
        sheet.write_number(row, 5, entry.freight_revenue.to_f64().unwrap_or_default())?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
