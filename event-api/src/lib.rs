//! Proxy facade over a connpass compatible events API.
//!
//! Six endpoints share one upstream fetcher and reshape its payload into
//! smaller projections.

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod metrics_defs;
pub mod types;

#[cfg(test)]
mod testutils;

use client::EventsClient;
use shared::http::{ServeError, serve};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum EventApiRunError {
    #[error("invalid event API config: {0}")]
    Config(#[from] config::ValidationError),
    #[error("could not create upstream client: {0}")]
    Client(#[from] errors::ClientInitError),
    #[error("server error: {0}")]
    Serve(#[from] ServeError),
}

pub async fn run(config: config::Config, api_key: &str) -> Result<(), EventApiRunError> {
    config.validate()?;

    let client = EventsClient::new(&config.upstream, api_key)?;
    tracing::info!(
        upstream = %client.events_url(),
        timeout_secs = config.upstream.timeout_secs,
        "Starting event API"
    );

    let app = api::router(Arc::new(client));
    serve("event-api", &config.listener, app).await?;
    Ok(())
}
