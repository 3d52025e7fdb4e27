//! Core types for wcp-core.
//!
//! This module defines the data structures shared across the pipeline: the
//! upstream [`Job`] record as Detrack returns it, and the per-run
//! [`ReportEntry`] the aggregator accumulates.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Job type Detrack uses for deliveries. Every other type counts as a pickup.
pub const DELIVERY_TYPE: &str = "Delivery";

/// A job record from the Detrack v2 `dn/jobs` endpoint.
///
/// Only the fields the report needs are kept; unknown keys are ignored and
/// `null` is read as the field's default so one sparse record cannot fail a
/// whole page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Job status, e.g. `completed`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Date the job is performed, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    /// `Delivery` or `Collection`.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub job_type: String,
    /// Number of entries in the item details list. Arrives as a float.
    #[serde(rename = "items_count", default, deserialize_with = "null_as_default")]
    pub item_count: f64,
    /// Price of the job as text, e.g. `"10.34"`. Numbers are accepted too.
    #[serde(default, deserialize_with = "price_text")]
    pub job_price: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub do_number: String,
    /// Free-text run label, e.g. `WCPNORTH - 8:00AM`.
    #[serde(rename = "run_number", default, deserialize_with = "null_as_default")]
    pub run_identifier: String,
}

impl Job {
    pub fn is_delivery(&self) -> bool {
        self.job_type == DELIVERY_TYPE
    }

    /// Item count truncated toward zero, see [`truncate_count`].
    pub fn parts(&self) -> u64 {
        truncate_count(self.item_count)
    }
}

/// Truncate a transported item count to a whole number of parts.
///
/// Fractions are dropped, never rounded (`2.9` → `2`). Negative, NaN and
/// infinite counts contribute nothing.
pub fn truncate_count(count: f64) -> u64 {
    if count.is_finite() && count > 0.0 {
        count.trunc() as u64
    } else {
        0
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn price_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Price>::deserialize(deserializer)? {
        Some(Price::Text(text)) => text,
        Some(Price::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

// ---------------------------------------------------------------------------
// ReportEntry
// ---------------------------------------------------------------------------

/// Aggregated statistics for one canonical run key over a reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReportEntry {
    pub run_key: String,
    pub orders_delivered: u64,
    pub parts_delivered: u64,
    pub orders_picked_up: u64,
    pub parts_picked_up: u64,
    /// Sum of job prices across deliveries and pickups.
    pub freight_revenue: Decimal,
}

impl ReportEntry {
    pub fn new(run_key: impl Into<String>) -> Self {
        Self {
            run_key: run_key.into(),
            ..Self::default()
        }
    }

    /// Add one job to the counters. `price` is the already-parsed job price.
    ///
    /// Counters saturate at `u64::MAX`. Returns `false` when adding `price`
    /// would overflow [`Decimal`]; the job is still counted but the revenue is
    /// left as it was.
    #[must_use]
    pub fn record(&mut self, job: &Job, price: Decimal) -> bool {
        if job.is_delivery() {
            self.orders_delivered = self.orders_delivered.saturating_add(1);
            self.parts_delivered = self.parts_delivered.saturating_add(job.parts());
        } else {
            self.orders_picked_up = self.orders_picked_up.saturating_add(1);
            self.parts_picked_up = self.parts_picked_up.saturating_add(job.parts());
        }
        match self.freight_revenue.checked_add(price) {
            Some(revenue) => {
                self.freight_revenue = revenue;
                true
            }
            None => false,
        }
    }

    pub fn total_orders(&self) -> u64 {
        self.orders_delivered.saturating_add(self.orders_picked_up)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
