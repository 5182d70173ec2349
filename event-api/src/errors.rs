use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub const NOT_FOUND_MESSAGE: &str = "イベントが見つかりません";

/// Errors surfaced by the event endpoints
#[derive(Clone, Error, Debug, PartialEq)]
pub enum EventApiError {
    /// Transport failure, timeout, non-2xx status or unreadable body from the
    /// upstream API. The upstream status only survives inside the message.
    #[error("connpass API エラー: {0}")]
    Upstream(String),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,
}

impl EventApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            EventApiError::NotFound => StatusCode::NOT_FOUND,
            EventApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ApiErrorResponse {
    detail: String,
}

impl IntoResponse for EventApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ApiErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Startup failures while building the upstream client.
#[derive(Error, Debug)]
pub enum ClientInitError {
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid API key: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
    #[error("could not build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
