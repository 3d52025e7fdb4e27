//! Detrack v2 API client.
//!
//! `GET {base}/dn/jobs?limit=N` returns one page of jobs plus a `links` map.
//! The client follows `links.next` until it is missing or null and returns
//! every job from every page. Relative `next` links are resolved against the
//! configured base URL.

use crate::{FeedError, JobSource};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use wcp_core::config::DetrackConfig;
use wcp_core::Job;

const API_KEY_HEADER: &str = "X-API-KEY";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One page of `dn/jobs`.
#[derive(Debug, Deserialize)]
struct JobsPage {
    #[serde(default)]
    data: Vec<Job>,
    #[serde(default)]
    links: HashMap<String, Option<String>>,
}

impl JobsPage {
    fn next_link(&self) -> Option<&str> {
        self.links
            .get("next")
            .and_then(|next| next.as_deref())
            .filter(|next| !next.is_empty())
    }
}

pub struct DetrackClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    fetch_limit: u32,
}

impl DetrackClient {
    pub fn new(config: &DetrackConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(FeedError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            fetch_limit: config.fetch_limit,
        })
    }

    fn first_page_url(&self) -> String {
        format!("{}/dn/jobs?limit={}", self.base_url, self.fetch_limit)
    }

    fn resolve_link(&self, link: &str) -> String {
        if link.starts_with("http") {
            link.to_string()
        } else {
            format!("{}{}", self.base_url, link)
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<JobsPage, FeedError> {
        let http_err = |source| FeedError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url, status = %status, "Detrack returned non-success status");
            return Err(FeedError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(http_err)?;
        serde_json::from_slice(&body).map_err(|source| FeedError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl JobSource for DetrackClient {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, FeedError> {
        tracing::info!(base_url = %self.base_url, limit = self.fetch_limit, "fetching jobs from Detrack");

        let mut jobs = Vec::new();
        let mut next = Some(self.first_page_url());

        while let Some(url) = next.take() {
            let page = self.fetch_page(&url).await?;
            next = page.next_link().map(|link| self.resolve_link(link));
            if next.as_deref() == Some(url.as_str()) {
                tracing::warn!(url = %url, "next link points at the current page; stopping");
                next = None;
            }

            jobs.extend(page.data);
            tracing::info!(count = jobs.len(), "retrieved jobs so far");
        }

        tracing::info!(total = jobs.len(), "finished fetching jobs");
        Ok(jobs)
    }

    fn describe(&self) -> String {
        format!("detrack {}", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
