//! Introductory endpoints: a greeting, path and query echoes, a toy user
//! lookup and a JSON body echo.

pub mod api;

use serde::Deserialize;
use shared::config::{Listener, ValidationError};
use shared::http::{ServeError, serve};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
}

#[derive(thiserror::Error, Debug)]
pub enum HelloError {
    #[error("invalid hello config: {0}")]
    Config(#[from] ValidationError),
    #[error("server error: {0}")]
    Serve(#[from] ServeError),
}

pub async fn run(config: Config) -> Result<(), HelloError> {
    config.listener.validate()?;
    serve("hello", &config.listener, api::router()).await?;
    Ok(())
}
