use crate::config::UpstreamConfig;
use crate::errors::{ClientInitError, EventApiError};
use crate::metrics_defs::{UPSTREAM_REQUEST_DURATION, UPSTREAM_REQUESTS};
use crate::types::{EventQuery, UpstreamEvents};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Response, StatusCode, Url};
use serde::Serialize;
use shared::{counter, histogram};
use std::fmt::Debug;
use std::time::{Duration, Instant};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Anything the endpoint handlers can fetch events from.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self, query: &EventQuery) -> Result<UpstreamEvents, EventApiError>;
}

/// Status and body text of an upstream response, whatever the status.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

/// HTTP client for the connpass compatible `/events/` resource.
#[derive(Clone)]
pub struct EventsClient {
    client: reqwest::Client,
    events_url: Url,
}

impl EventsClient {
    pub fn new(config: &UpstreamConfig, api_key: &str) -> Result<Self, ClientInitError> {
        let events_url = format!(
            "{}/{}/",
            config.base_url.as_str().trim_end_matches('/'),
            "events"
        );
        let events_url = Url::parse(&events_url)?;

        let mut key = HeaderValue::from_str(api_key)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(EventsClient { client, events_url })
    }

    pub fn events_url(&self) -> &Url {
        &self.events_url
    }

    /// Returns the upstream status and body untouched. A non-success status
    /// is not an error here, only transport failures are.
    pub async fn fetch_raw<Q>(&self, query: &Q) -> Result<RawResponse, EventApiError>
    where
        Q: Serialize + Debug + Sync + ?Sized,
    {
        let response = self.send(query).await?;
        let status = response.status();
        let body = response.text().await.map_err(upstream_error)?;

        Ok(RawResponse { status, body })
    }

    async fn send<Q>(&self, query: &Q) -> Result<Response, EventApiError>
    where
        Q: Serialize + Debug + Sync + ?Sized,
    {
        tracing::info!(params = ?query, "Fetching events");

        let start = Instant::now();
        let result = self
            .client
            .get(self.events_url.clone())
            .query(query)
            .send()
            .await;

        let outcome = match &result {
            Ok(response) if response.status().is_success() => "ok",
            Ok(_) => "status",
            Err(e) if e.is_timeout() => "timeout",
            Err(_) => "transport",
        };
        counter!(UPSTREAM_REQUESTS, "outcome" => outcome).increment(1);
        histogram!(UPSTREAM_REQUEST_DURATION, "outcome" => outcome)
            .record(start.elapsed().as_secs_f64());

        result.map_err(upstream_error)
    }
}

fn upstream_error(e: reqwest::Error) -> EventApiError {
    tracing::warn!(error = %e, "Upstream request failed");
    EventApiError::Upstream(e.to_string())
}

#[async_trait]
impl EventSource for EventsClient {
    async fn fetch_events(&self, query: &EventQuery) -> Result<UpstreamEvents, EventApiError> {
        let response = self
            .send(query)
            .await?
            .error_for_status()
            .map_err(upstream_error)?;
        // Valid JSON of the wrong shape is an empty result, only an
        // undecodable body is an error.
        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(upstream_error)?;

        Ok(UpstreamEvents::from_body(body))
    }
}
