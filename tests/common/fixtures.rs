//! Static run-identifier corpora and job fixtures used across harnesses.
//!
//! The corpora are grouped by what the normalizer should do with them:
//! converge on a known canonical key, or fall back to the cleaned input.

use super::builders::{delivery, pickup, JobBuilder};
use wcp_core::Job;

/// Spellings of the north 8am run seen in real Detrack exports. Every entry
/// must normalize to `WCPNORTH - 8:00AM`.
pub const NORTH_8AM_SPELLINGS: &[&str] = &[
    "WCPNORTH - 8:00AM",
    "WCPNORTH-8:00AM",
    "WCP NORTH - 8:00AM",
    "WCPNORTH-8AM",
    "WCPNORTH-8AM 01/05/26",
    "WCPNORTH-8:00AM 01/05/26",
    "NORTH 8AM",
    "north 8am",
    "NORTH 8 AM",
    "8am north",
    "  NORTH 8:00 am  ",
    "North 8:00AM 12/01/26",
];

/// `(raw, canonical)` pairs covering every built-in route and time alias.
pub const CANONICAL_PAIRS: &[(&str, &str)] = &[
    ("WCPSOUTH-10:30AM", "WCPSOUTH - 10:30AM"),
    ("south 10:30 am", "WCPSOUTH - 10:30AM"),
    ("WCPGC-1PM", "WCPGC - 1:00PM"),
    ("GC 1:00PM", "WCPGC - 1:00PM"),
    ("WCPGC - 12PM", "WCPGC - 12:00PM"),
    ("gc 12:00 pm", "WCPGC - 12:00PM"),
    ("NORTH 3PM", "WCPNORTH - 3:00PM"),
    ("NORTH 11:15AM", "WCPNORTH - 11:15AM"),
];

/// `(raw, fallback)` pairs for identifiers missing a route or a time.
pub const FALLBACK_PAIRS: &[(&str, &str)] = &[
    ("WCPXYZ-8AM", "WCPXYZ 8AM"),
    ("WCPNORTH", "WCPNORTH"),
    ("WCPNORTH-late", "WCPNORTH late"),
    ("EAST 8AM", "EAST 8AM"),
    ("NORTH", "NORTH"),
    ("Run 7", "Run 7"),
    ("northern 8am", "northern 8am"),
    ("  spare van 01/05/26", "spare van"),
    ("01/05/26", ""),
    ("", ""),
];

/// The two-job scenario from the run report walkthrough: a delivery and a
/// collection on the same run, spelled differently, one with a bad price.
pub fn north_scenario_jobs() -> Vec<Job> {
    vec![
        delivery("WCPNORTH-8:00AM 01/05/26", "2026-01-05", 3.0, "12.50"),
        pickup("NORTH 8AM", "2026-01-10", 2.0, "bad"),
    ]
}

/// A mixed month of jobs across three runs, with noise the aggregator must
/// filter out: wrong status, outside the window, unparseable dates.
pub fn january_mixed_jobs() -> Vec<Job> {
    vec![
        delivery("WCPNORTH-8AM", "2026-01-02", 4.0, "20.00"),
        delivery("north 8am", "2026-01-15", 1.5, "5.25"),
        pickup("NORTH 8:00AM", "2026-01-31", 2.0, "3"),
        delivery("WCPSOUTH-10:30AM", "2026-01-03", 6.0, "40.10"),
        pickup("south 10:30 am", "2026-01-20", 1.0, ""),
        delivery("GC 1PM", "2026-01-09", 2.9, "7.333"),
        // Filtered out.
        JobBuilder::new("WCPGC-1PM")
            .status("dispatched")
            .date("2026-01-09")
            .price("100")
            .build(),
        delivery("WCPGC-1PM", "2026-02-01", 1.0, "100"),
        delivery("WCPGC-1PM", "2025-12-31", 1.0, "100"),
        delivery("WCPGC-1PM", "09/01/2026", 1.0, "100"),
    ]
}

/// A page of Detrack `dn/jobs` data as the API serialises it: prices as
/// strings or numbers, occasional nulls.
pub fn detrack_page_json(ids: std::ops::Range<u32>) -> Vec<serde_json::Value> {
    ids.map(|i| {
        serde_json::json!({
            "id": format!("det-{i}"),
            "status": "completed",
            "date": "2026-01-12",
            "type": if i % 2 == 0 { "Delivery" } else { "Collection" },
            "items_count": 2,
            "job_price": if i % 3 == 0 { serde_json::json!(10.5) } else { serde_json::json!("1.25") },
            "do_number": format!("DO{i:05}"),
            "run_number": if i % 2 == 0 { "WCPNORTH-8AM" } else { "north 8:00 am" },
            "address": "1 Example St",
            "tracking_status": null,
        })
    })
    .collect()
}
