//! Reporting window resolution.
//!
//! A [`ReportWindow`] is the half-open date range `[from, to)` the aggregator
//! reports over. Dates are calendar dates in the reporting time zone, so job
//! dates (which Detrack gives as bare `YYYY-MM-DD`) compare directly against
//! the bounds.
//!
//! The scheduled run picks its cadence from today's day of month: during the
//! first seven days it reports the previous calendar month, otherwise the
//! previous Monday–Sunday week.

use crate::error::WindowError;
use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;

/// Wire format of Detrack job dates and of CLI date arguments.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Last day of month that still triggers the monthly report.
const MONTHLY_CUTOFF_DAY: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Monthly,
    Weekly,
    /// Explicit `--from`/`--to` range.
    Custom,
}

impl Cadence {
    pub fn label(&self) -> &'static str {
        match self {
            Cadence::Monthly => "Monthly",
            Cadence::Weekly => "Weekly",
            Cadence::Custom => "Custom",
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    from: NaiveDate,
    to: NaiveDate,
    cadence: Cadence,
}

impl ReportWindow {
    /// An explicit window. `from` must be strictly before `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, WindowError> {
        if from >= to {
            return Err(WindowError::Empty { from, to });
        }
        Ok(Self {
            from,
            to,
            cadence: Cadence::Custom,
        })
    }

    /// The scheduled window for a run happening on `today`.
    pub fn resolve(today: NaiveDate) -> Result<Self, WindowError> {
        let out_of_range = || WindowError::OutOfRange(today);

        if today.day() <= MONTHLY_CUTOFF_DAY {
            let to = today.with_day(1).ok_or_else(out_of_range)?;
            let from = to
                .checked_sub_months(Months::new(1))
                .ok_or_else(out_of_range)?;
            return Ok(Self {
                from,
                to,
                cadence: Cadence::Monthly,
            });
        }

        let since_monday = u64::from(today.weekday().num_days_from_monday());
        let to = today
            .checked_sub_days(Days::new(since_monday))
            .ok_or_else(out_of_range)?;
        let from = to.checked_sub_days(Days::new(7)).ok_or_else(out_of_range)?;
        Ok(Self {
            from,
            to,
            cadence: Cadence::Weekly,
        })
    }

    /// [`resolve`](Self::resolve) for the current date in `tz`.
    pub fn resolve_now(tz: Tz) -> Result<Self, WindowError> {
        Self::resolve(Utc::now().with_timezone(&tz).date_naive())
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// Exclusive upper bound.
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date < self.to
    }

    /// File name (without extension) for the report covering this window.
    pub fn report_file_stem(&self) -> String {
        match self.cadence {
            Cadence::Monthly => format!(
                "{}_{:02}_detrack_monthly_report",
                self.from.year(),
                self.from.month()
            ),
            Cadence::Weekly => format!(
                "{}_detrack_weekly_report",
                self.from.format(DATE_FORMAT)
            ),
            Cadence::Custom => format!(
                "{}_{}_detrack_report",
                self.from.format(DATE_FORMAT),
                self.to.format(DATE_FORMAT)
            ),
        }
    }
}

impl std::fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{} - {})",
            self.cadence,
            self.from.format(DATE_FORMAT),
            self.to.format(DATE_FORMAT)
        )
    }
}

/// Parse a `YYYY-MM-DD` date. `None` for anything else.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
