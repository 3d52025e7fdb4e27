//! Aggregator: rolls job records up into one [`ReportEntry`] per run.
//!
//! A pass filters jobs by status and by [`ReportWindow`], keys each surviving
//! job by its canonical run key, and accumulates counters and revenue. A bad
//! price or date on one job never aborts the pass: bad dates drop the job, bad
//! prices count as zero and are reported as [`JobWarning`]s. A price that
//! would overflow its run's revenue is left out of the sum and warned about.

use crate::error::JobWarning;
use crate::normalizer::RunNormalizer;
use crate::types::{Job, ReportEntry};
use crate::window::{self, ReportWindow};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Counts of what happened to each job in a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub seen: usize,
    pub wrong_status: usize,
    /// Unparseable date, or a date outside the window.
    pub out_of_window: usize,
    pub aggregated: usize,
    /// Aggregated jobs whose run key came out empty.
    pub unidentified: usize,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// One entry per canonical run key, in no particular order.
    pub entries: Vec<ReportEntry>,
    pub warnings: Vec<JobWarning>,
    pub stats: PassStats,
}

impl RunReport {
    pub fn into_entries(self) -> Vec<ReportEntry> {
        self.entries
    }

    pub fn entry(&self, run_key: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.run_key == run_key)
    }
}

pub struct Aggregator<'n> {
    normalizer: &'n RunNormalizer,
}

impl<'n> Aggregator<'n> {
    pub fn new(normalizer: &'n RunNormalizer) -> Self {
        Self { normalizer }
    }

    /// Aggregate every job with `status` dated inside `window`.
    pub fn aggregate(&self, jobs: &[Job], status: &str, window: &ReportWindow) -> RunReport {
        let mut by_run: HashMap<String, ReportEntry> = HashMap::new();
        let mut warnings = Vec::new();
        let mut stats = PassStats::default();

        for job in jobs {
            stats.seen += 1;

            if job.status != status {
                stats.wrong_status += 1;
                continue;
            }

            match window::parse_date(&job.date) {
                Some(date) if window.contains(date) => {}
                _ => {
                    stats.out_of_window += 1;
                    continue;
                }
            }

            let run_key = self.normalizer.normalize(&job.run_identifier);
            if run_key.trim().is_empty() {
                stats.unidentified += 1;
                tracing::debug!(job_id = %job.id, raw = %job.run_identifier, "job has no usable run identifier");
            }

            let price = match parse_price(&job.job_price) {
                Ok(price) => price,
                Err(reason) => {
                    tracing::warn!(job_id = %job.id, job_price = %job.job_price, error = %reason, "failed to parse job price");
                    warnings.push(JobWarning::MalformedPrice {
                        job_id: job.id.clone(),
                        raw: job.job_price.clone(),
                        reason,
                    });
                    Decimal::ZERO
                }
            };

            let added = by_run
                .entry(run_key)
                .or_insert_with_key(|key| ReportEntry::new(key.clone()))
                .record(job, price);
            if !added {
                tracing::warn!(job_id = %job.id, job_price = %job.job_price, "job price overflows run revenue");
                warnings.push(JobWarning::RevenueOverflow {
                    job_id: job.id.clone(),
                    raw: job.job_price.clone(),
                });
            }
            stats.aggregated += 1;
        }

        tracing::debug!(
            seen = stats.seen,
            aggregated = stats.aggregated,
            runs = by_run.len(),
            "aggregation pass finished"
        );

        RunReport {
            entries: by_run.into_values().collect(),
            warnings,
            stats,
        }
    }
}

/// Parse a Detrack `job_price` as a plain decimal literal.
///
/// `rust_decimal` skips `_` separators, so `"1_000"` would otherwise read as
/// a thousand; Detrack never writes them and they are rejected here.
fn parse_price(raw: &str) -> Result<Decimal, String> {
    if raw.contains('_') {
        return Err("digit separators are not allowed".to_string());
    }
    raw.parse::<Decimal>().map_err(|err| err.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
