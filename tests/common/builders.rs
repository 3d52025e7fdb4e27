//! Test builders: ergonomic constructors for `Job`, windows and normalizers.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use fake::{Fake, Faker};
use wcp_core::window::parse_date;
use wcp_core::{Job, ReportWindow, RunNormalizer};

// ---------------------------------------------------------------------------
// JobBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Job`] test fixtures.
///
/// Defaults to a completed single-item delivery on 2026-01-05 priced at zero.
///
/// # Example
///
/// ```rust
/// let job = JobBuilder::new("NORTH 8AM")
///     .pickup()
///     .items(2.0)
///     .price("12.50")
///     .build();
/// ```
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(run_identifier: impl Into<String>) -> Self {
        let id = format!("job-{}", Faker.fake::<u32>());
        Self {
            job: Job {
                do_number: format!("DO-{id}"),
                id,
                status: "completed".to_string(),
                date: "2026-01-05".to_string(),
                job_type: "Delivery".to_string(),
                item_count: 1.0,
                job_price: "0".to_string(),
                run_identifier: run_identifier.into(),
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.job.id = id.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.job.status = status.into();
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.job.date = date.into();
        self
    }

    pub fn job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job.job_type = job_type.into();
        self
    }

    /// Shorthand for a `Collection` job.
    pub fn pickup(self) -> Self {
        self.job_type("Collection")
    }

    pub fn items(mut self, count: f64) -> Self {
        self.job.item_count = count;
        self
    }

    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.job.job_price = price.into();
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Completed delivery on `date`.
pub fn delivery(run: &str, date: &str, items: f64, price: &str) -> Job {
    JobBuilder::new(run).date(date).items(items).price(price).build()
}

/// Completed collection on `date`.
pub fn pickup(run: &str, date: &str, items: f64, price: &str) -> Job {
    JobBuilder::new(run)
        .pickup()
        .date(date)
        .items(items)
        .price(price)
        .build()
}

/// Explicit `[from, to)` window from `YYYY-MM-DD` strings.
pub fn window(from: &str, to: &str) -> ReportWindow {
    ReportWindow::new(date(from), date(to)).expect("test window must not be empty")
}

/// `[2026-01-01, 2026-02-01)`.
pub fn january_2026() -> ReportWindow {
    window("2026-01-01", "2026-02-01")
}

pub fn date(s: &str) -> chrono::NaiveDate {
    parse_date(s).unwrap_or_else(|| panic!("bad test date {s:?}"))
}

pub fn normalizer() -> RunNormalizer {
    RunNormalizer::default()
}
