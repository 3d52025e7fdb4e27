//! Error and warning types for wcp-core.
//!
//! Collaborator failures (config, files, spreadsheet writer) are errors and end
//! the run. Bad upstream records are never errors: the aggregator reports them
//! as [`JobWarning`]s and keeps going.

use chrono::NaiveDate;
use std::path::PathBuf;

/// A non-fatal problem with a single job, found during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobWarning {
    #[error("job {job_id}: unparseable job_price {raw:?} ({reason}); counted as 0")]
    MalformedPrice {
        job_id: String,
        raw: String,
        reason: String,
    },

    #[error("job {job_id}: job_price {raw:?} overflows the run's revenue; not added")]
    RevenueOverflow { job_id: String, raw: String },
}

/// Configuration could not be loaded or is incomplete.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required setting `{key}` (set it in the config file or via {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },

    #[error("unknown time zone {0:?}")]
    UnknownTimezone(String),

    #[error("invalid route alias table: {0}")]
    Aliases(#[from] regex::Error),
}

/// A reporting window could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("empty reporting window: {from} is not before {to}")]
    Empty { from: NaiveDate, to: NaiveDate },

    #[error("no reporting window can be resolved for {0}")]
    OutOfRange(NaiveDate),
}

/// Writing a report artifact failed.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("xlsx: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("unknown export format {0:?} (expected csv or xlsx)")]
    UnknownFormat(String),
}
