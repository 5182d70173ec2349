use crate::client::EventSource;
use crate::errors::EventApiError;
use crate::metrics_defs::EVENTS_RETURNED;
use crate::types::{
    EventCount, EventDetail, EventFilter, EventQuery, EventSummary, default_limit,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use shared::histogram;
use std::sync::Arc;

type Source = Arc<dyn EventSource>;

pub fn router(source: Source) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{event_id}/detail", get(event_detail))
        .route("/events/pref/{prefecture}", get(events_by_prefecture))
        .route("/events/group/{subdomain}", get(events_by_group))
        .route("/events/count", get(event_count))
        .route("/events/filter", post(filter_events))
        .with_state(source)
}

#[derive(Deserialize, Debug)]
struct ListParams {
    #[serde(default)]
    keyword: String,
    #[serde(default = "default_limit")]
    limit: i64,
}

#[derive(Deserialize, Debug)]
struct CountParams {
    #[serde(default)]
    keyword: String,
}

/// Fetches and projects to summaries. Never fails on an empty result.
async fn summaries(
    source: &dyn EventSource,
    query: EventQuery,
    endpoint: &'static str,
) -> Result<Json<Vec<EventSummary>>, EventApiError> {
    // A negative count is left for the upstream to judge.
    let limit = usize::try_from(query.count).unwrap_or(usize::MAX);
    let data = source.fetch_events(&query).await?;

    let events: Vec<EventSummary> = data
        .events
        .into_iter()
        .take(limit)
        .map(EventSummary::from)
        .collect();
    histogram!(EVENTS_RETURNED, "endpoint" => endpoint).record(events.len() as f64);

    Ok(Json(events))
}

async fn list_events(
    State(source): State<Source>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<EventSummary>>, EventApiError> {
    let query = EventQuery::by_keyword(params.keyword, params.limit);
    summaries(source.as_ref(), query, "list").await
}

async fn event_detail(
    State(source): State<Source>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventDetail>, EventApiError> {
    let data = source.fetch_events(&EventQuery::by_id(event_id)).await?;

    let event = data.events.into_iter().next().ok_or_else(|| {
        tracing::debug!(event_id, "Event not found upstream");
        EventApiError::NotFound
    })?;

    Ok(Json(event.into()))
}

async fn events_by_prefecture(
    State(source): State<Source>,
    Path(prefecture): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<EventSummary>>, EventApiError> {
    let query = EventQuery {
        prefecture: Some(prefecture),
        ..EventQuery::by_keyword(params.keyword, params.limit)
    };
    summaries(source.as_ref(), query, "prefecture").await
}

async fn events_by_group(
    State(source): State<Source>,
    Path(subdomain): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<EventSummary>>, EventApiError> {
    let query = EventQuery {
        subdomain: Some(subdomain),
        ..EventQuery::by_keyword(params.keyword, params.limit)
    };
    summaries(source.as_ref(), query, "group").await
}

async fn event_count(
    State(source): State<Source>,
    Query(params): Query<CountParams>,
) -> Result<Json<EventCount>, EventApiError> {
    let data = source
        .fetch_events(&EventQuery::by_keyword(params.keyword, 1))
        .await?;

    Ok(Json(EventCount {
        count: data.results_available.unwrap_or(0),
    }))
}

async fn filter_events(
    State(source): State<Source>,
    Json(filter): Json<EventFilter>,
) -> Result<Json<Vec<EventSummary>>, EventApiError> {
    summaries(source.as_ref(), filter.into(), "filter").await
}
