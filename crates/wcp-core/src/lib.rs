//! wcp-core: run report core library.
//!
//! This crate holds everything between the job source and the mailer: the
//! shared types, the run identifier normalizer, the aggregation pass, the
//! reporting window resolver, configuration and the report writers.
//!
//! # Architecture
//!
//! ```text
//! JobSource ──► Aggregator ──► Export ──► Mailer
//!                   │
//!                   └──► Normalizer (per job)
//! ```
//!
//! The normalizer and aggregator are synchronous and pure; all I/O lives in
//! `wcp-feeds`, `wcp-mail` and the export writers.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod export;
pub mod normalizer;
pub mod types;
pub mod window;

pub use aggregator::{Aggregator, PassStats, RunReport};
pub use error::JobWarning;
pub use normalizer::{RunAliases, RunNormalizer};
pub use types::{Job, ReportEntry};
pub use window::{Cadence, ReportWindow};
