//! Fake Detrack v2 API server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /dn/jobs?limit=N[&page=P]`: one configured page of jobs plus a
//!   `links` object whose `next` points at the following page, or is null on
//!   the last one
//!
//! Every request's `X-API-KEY` header and query string are recorded so tests
//! can assert on what the client sent.
//!
//! # Example
//!
//! ```rust,no_run
//! # tokio_test::block_on(async {
//! use common::fake_detrack_api::FakeDetrackApi;
//!
//! let api = FakeDetrackApi::start().await.unwrap();
//! api.add_page(vec![serde_json::json!({"id": "1", "run_number": "NORTH 8AM"})]).await;
//!
//! // Point a DetrackClient at api.base_url()
//! let url = api.base_url();
//! # });
//! ```

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// How `links.next` is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// `/dn/jobs?...`, resolved by the client against its base URL.
    #[default]
    Relative,
    /// `http://127.0.0.1:PORT/dn/jobs?...`
    Absolute,
    /// Every page links to itself.
    SelfLoop,
}

/// A request as the server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub api_key: Option<String>,
    pub limit: Option<u32>,
    pub page: usize,
}

/// State shared between the router and test code.
#[derive(Default)]
struct ApiState {
    base_url: String,
    pages: Vec<Vec<serde_json::Value>>,
    link_style: LinkStyle,
    /// Respond to every request with this status and no body.
    fail_with: Option<u16>,
    /// Respond with a body that is not a jobs page.
    garbage: bool,
    requests: Vec<SeenRequest>,
}

#[derive(Debug, Deserialize)]
struct JobsQuery {
    limit: Option<u32>,
    page: Option<usize>,
}

/// Handle to the running fake Detrack API server.
pub struct FakeDetrackApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeDetrackApi {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState {
            base_url: format!("http://{addr}"),
            ..ApiState::default()
        }));

        let app = Router::new()
            .route("/dn/jobs", get(list_jobs))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the task a moment to register.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Append a page of raw job objects.
    pub async fn add_page(&self, jobs: Vec<serde_json::Value>) {
        self.state.lock().await.pages.push(jobs);
    }

    pub async fn set_link_style(&self, style: LinkStyle) {
        self.state.lock().await.link_style = style;
    }

    pub async fn fail_with(&self, status: u16) {
        self.state.lock().await.fail_with = Some(status);
    }

    pub async fn serve_garbage(&self) {
        self.state.lock().await.garbage = true;
    }

    pub async fn requests(&self) -> Vec<SeenRequest> {
        self.state.lock().await.requests.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn list_jobs(
    Query(query): Query<JobsQuery>,
    headers: HeaderMap,
    State(state): State<Arc<Mutex<ApiState>>>,
) -> Response {
    let mut state = state.lock().await;
    let page = query.page.unwrap_or(1);
    state.requests.push(SeenRequest {
        api_key: headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        limit: query.limit,
        page,
    });

    if let Some(code) = state.fail_with {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, String::new()).into_response();
    }
    if state.garbage {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }

    let data = state.pages.get(page.saturating_sub(1)).cloned().unwrap_or_default();
    let limit = query.limit.unwrap_or(1000);
    let path = |p: usize| format!("/dn/jobs?limit={limit}&page={p}");

    let next = match state.link_style {
        LinkStyle::SelfLoop => Some(format!("{}{}", state.base_url, path(page))),
        _ if page >= state.pages.len() => None,
        LinkStyle::Relative => Some(path(page + 1)),
        LinkStyle::Absolute => Some(format!("{}{}", state.base_url, path(page + 1))),
    };

    axum::Json(serde_json::json!({
        "data": data,
        "links": { "next": next, "prev": null },
        "meta": { "page": page, "per_page": limit },
    }))
    .into_response()
}
