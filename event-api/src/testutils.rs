use crate::client::{API_KEY_HEADER, EventSource};
use crate::errors::EventApiError;
use crate::types::{EventQuery, UpstreamEvents};
use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub query: Vec<(String, String)>,
    pub api_key: Option<String>,
}

impl RecordedRequest {
    pub fn params(&self) -> Vec<(&str, &str)> {
        self.query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    content_type: &'static str,
    body: String,
    delay: Duration,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// In-process stand-in for the upstream `/events/` resource. Answers every
/// request with a fixed status and body and records what it received.
pub struct MockUpstream {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    pub async fn spawn(status: StatusCode, body: serde_json::Value) -> Self {
        Self::spawn_delayed(status, body, Duration::ZERO).await
    }

    pub async fn spawn_delayed(
        status: StatusCode,
        body: serde_json::Value,
        delay: Duration,
    ) -> Self {
        Self::start(status, "application/json", body.to_string(), delay).await
    }

    /// Answers with a `text/plain` body instead of JSON.
    pub async fn spawn_text(status: StatusCode, body: &str) -> Self {
        Self::start(status, "text/plain", body.to_owned(), Duration::ZERO).await
    }

    async fn start(
        status: StatusCode,
        content_type: &'static str,
        body: String,
        delay: Duration,
    ) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            content_type,
            body,
            delay,
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/events/", get(mock_events))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpstream {
            addr,
            requests,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn mock_events(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(RecordedRequest {
        query,
        api_key: headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (
        state.status,
        [(header::CONTENT_TYPE, state.content_type)],
        state.body,
    )
}

/// Event source that replays a canned result and records every query.
#[derive(Clone)]
pub struct FakeSource {
    result: Result<UpstreamEvents, EventApiError>,
    queries: Arc<Mutex<Vec<EventQuery>>>,
}

impl FakeSource {
    pub fn new(body: serde_json::Value) -> Self {
        FakeSource {
            result: Ok(UpstreamEvents::from_body(body)),
            queries: Arc::default(),
        }
    }

    pub fn failing(error: EventApiError) -> Self {
        FakeSource {
            result: Err(error),
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Vec<EventQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSource for FakeSource {
    async fn fetch_events(&self, query: &EventQuery) -> Result<UpstreamEvents, EventApiError> {
        self.queries.lock().unwrap().push(query.clone());
        self.result.clone()
    }
}
