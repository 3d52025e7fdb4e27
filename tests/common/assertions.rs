//! Domain-specific assertions for wcp-report harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that say which
//! run or which counter went wrong, rather than dumping two whole reports.

use rust_decimal::Decimal;
use wcp_core::{Job, ReportEntry, RunReport};

// ---------------------------------------------------------------------------
// Run assertions
// ---------------------------------------------------------------------------

/// Assert that a report has an entry for `run_key` with the given counters.
///
/// ```rust
/// assert_run!(report, "WCPNORTH - 8:00AM", delivered: (1, 3), picked_up: (1, 2), revenue: "12.50");
/// ```
#[macro_export]
macro_rules! assert_run {
    ($report:expr, $key:expr, delivered: ($od:expr, $pd:expr), picked_up: ($op:expr, $pp:expr), revenue: $rev:expr) => {{
        let report: &wcp_core::RunReport = &$report;
        let key: &str = $key;
        let entry = match report.entry(key) {
            Some(entry) => entry,
            None => panic!(
                "assert_run! failed: no entry for {:?}.\n  Available runs: {:?}",
                key,
                report.entries.iter().map(|e| e.run_key.as_str()).collect::<Vec<_>>()
            ),
        };
        let expected = wcp_core::ReportEntry {
            run_key: key.to_string(),
            orders_delivered: $od,
            parts_delivered: $pd,
            orders_picked_up: $op,
            parts_picked_up: $pp,
            freight_revenue: $rev.parse::<rust_decimal::Decimal>().expect("revenue literal"),
        };
        pretty_assertions::assert_eq!(*entry, expected, "run {:?}", key);
    }};
}

/// Assert the sorted set of run keys in a report.
#[macro_export]
macro_rules! assert_run_keys {
    ($report:expr, [$($key:expr),* $(,)?]) => {{
        let report: &wcp_core::RunReport = &$report;
        let mut actual: Vec<&str> = report.entries.iter().map(|e| e.run_key.as_str()).collect();
        actual.sort_unstable();
        let mut expected: Vec<&str> = vec![$($key),*];
        expected.sort_unstable();
        pretty_assertions::assert_eq!(actual, expected);
    }};
}

// ---------------------------------------------------------------------------
// Whole-report checks
// ---------------------------------------------------------------------------

/// Every aggregated job lands in exactly one entry: order counts add up to
/// the number of aggregated jobs, and no two entries share a run key.
pub fn assert_complete(report: &RunReport) {
    let orders: u64 = report.entries.iter().map(ReportEntry::total_orders).sum();
    assert_eq!(
        orders, report.stats.aggregated as u64,
        "order counts do not add up to the aggregated job count: {:?}",
        report.stats
    );

    let mut keys: Vec<&str> = report.entries.iter().map(|e| e.run_key.as_str()).collect();
    keys.sort_unstable();
    let before = keys.len();
    keys.dedup();
    assert_eq!(before, keys.len(), "duplicate run keys in report");
}

/// Every job is accounted for by exactly one pass counter.
pub fn assert_stats_balance(report: &RunReport, jobs: &[Job]) {
    let stats = report.stats;
    assert_eq!(stats.seen, jobs.len(), "seen != input length");
    assert_eq!(
        stats.wrong_status + stats.out_of_window + stats.aggregated,
        stats.seen,
        "pass counters do not balance: {stats:?}"
    );
}

pub fn total_revenue(report: &RunReport) -> Decimal {
    report.entries.iter().map(|e| e.freight_revenue).sum()
}
