//! wcp-feeds: job sources for wcp-report.
//!
//! Each source produces the complete, finite job list for one report run.
//! Pagination and transport stay in here; the aggregator in `wcp-core` only
//! ever sees a finished `Vec<Job>`.

pub mod detrack;
pub mod snapshot;

pub use detrack::DetrackClient;
pub use snapshot::SnapshotSource;

use wcp_core::Job;

/// Failures while fetching or reading jobs. All of them end the run.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("undecodable jobs page from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot {path}: {source}")]
    Snapshot {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {path} is not a job list: {source}")]
    SnapshotFormat {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Trait implemented by each job source.
#[allow(async_fn_in_trait)]
pub trait JobSource {
    /// Every job the source has for this run, in source order.
    async fn fetch_jobs(&self) -> Result<Vec<Job>, FeedError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}
