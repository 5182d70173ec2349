use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_ORDER: i64 = 2;
pub const DEFAULT_COUNT: i64 = 10;

/// Parameters forwarded to the upstream `/events/` resource.
///
/// Absent filters are left out of the query string entirely. `order` and
/// `count` are always sent. Order 2 sorts by start date, newest first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,
    pub order: i64,
    pub count: i64,
}

impl Default for EventQuery {
    fn default() -> Self {
        EventQuery {
            event_id: None,
            keyword: None,
            subdomain: None,
            prefecture: None,
            order: DEFAULT_ORDER,
            count: DEFAULT_COUNT,
        }
    }
}

impl EventQuery {
    pub fn by_id(event_id: i64) -> Self {
        EventQuery {
            event_id: Some(event_id),
            ..Default::default()
        }
    }

    pub fn by_keyword<K: Into<String>>(keyword: K, count: i64) -> Self {
        EventQuery {
            keyword: Some(keyword.into()),
            count,
            ..Default::default()
        }
    }
}

/// Query of the one-shot search command. Only the keyword and the count
/// are sent, the upstream picks its own order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchQuery {
    pub keyword: String,
    pub count: i64,
}

/// Deserializes `T`, turning a missing, null or mistyped value into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items: Option<Vec<serde_json::Value>> = lenient(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct UpstreamGroup {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
}

/// One event as returned by the upstream API. Only the fields the
/// projections read are kept.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct UpstreamEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub catch: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub started_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ended_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub group: Option<UpstreamGroup>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub place: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct UpstreamEvents {
    #[serde(default, deserialize_with = "lenient_list")]
    pub events: Vec<UpstreamEvent>,
    #[serde(default, deserialize_with = "lenient")]
    pub results_available: Option<i64>,
}

impl UpstreamEvents {
    /// Reads a decoded upstream body. Anything other than a JSON object
    /// counts as an empty result.
    pub fn from_body(body: serde_json::Value) -> Self {
        if !body.is_object() {
            return UpstreamEvents::default();
        }
        serde_json::from_value(body).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventSummary {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub started_at: Option<String>,
    pub place: Option<String>,
}

impl From<UpstreamEvent> for EventSummary {
    fn from(event: UpstreamEvent) -> Self {
        EventSummary {
            id: event.id,
            title: event.title,
            url: event.url,
            started_at: event.started_at,
            place: event.place,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventDetail {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub catch: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub group: Option<String>,
    pub address: Option<String>,
    pub place: Option<String>,
}

impl From<UpstreamEvent> for EventDetail {
    fn from(event: UpstreamEvent) -> Self {
        EventDetail {
            id: event.id,
            title: event.title,
            catch: event.catch,
            description: event.description,
            url: event.url,
            started_at: event.started_at,
            ended_at: event.ended_at,
            group: event.group.and_then(|g| g.title),
            address: event.address,
            place: event.place,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventCount {
    pub count: i64,
}

/// Request body of `POST /events/filter`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EventFilter {
    #[serde(default)]
    pub keyword: String,
    pub prefecture: Option<String>,
    pub subdomain: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub(crate) fn default_limit() -> i64 {
    DEFAULT_COUNT
}

impl From<EventFilter> for EventQuery {
    fn from(filter: EventFilter) -> Self {
        EventQuery {
            keyword: Some(filter.keyword),
            prefecture: filter.prefecture,
            subdomain: filter.subdomain,
            count: filter.limit,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_omits_absent_filters() {
        let query = EventQuery::by_keyword("python", 5);
        let encoded = serde_json::to_value(&query).unwrap();
        assert_eq!(
            encoded,
            json!({"keyword": "python", "order": 2, "count": 5})
        );
    }

    #[test]
    fn query_by_id_uses_defaults() {
        let query = EventQuery::by_id(42);
        assert_eq!(query.event_id, Some(42));
        assert_eq!(query.keyword, None);
        assert_eq!(query.order, 2);
        assert_eq!(query.count, 10);
    }

    #[test]
    fn upstream_event_tolerates_missing_fields() {
        let events: UpstreamEvents = serde_json::from_value(json!({
            "events": [{"id": 1, "title": "T"}, {}]
        }))
        .unwrap();

        assert_eq!(events.results_available, None);
        assert_eq!(events.events.len(), 2);
        assert_eq!(events.events[0].title.as_deref(), Some("T"));
        assert_eq!(events.events[0].url, None);
        assert_eq!(events.events[1], UpstreamEvent::default());
    }

    #[test]
    fn upstream_event_tolerates_mistyped_fields() {
        let event: UpstreamEvent = serde_json::from_value(json!({
            "id": "not-a-number",
            "title": "T",
            "place": 12,
            "group": "no-object",
        }))
        .unwrap();

        assert_eq!(event.id, None);
        assert_eq!(event.title.as_deref(), Some("T"));
        assert_eq!(event.place, None);
        assert_eq!(event.group, None);
    }

    #[test]
    fn upstream_events_tolerates_missing_list() {
        let events: UpstreamEvents =
            serde_json::from_value(json!({"results_available": 3})).unwrap();
        assert!(events.events.is_empty());
        assert_eq!(events.results_available, Some(3));

        let events: UpstreamEvents = serde_json::from_value(json!({"events": null})).unwrap();
        assert!(events.events.is_empty());
    }

    #[test]
    fn bad_list_entry_only_drops_itself() {
        let events: UpstreamEvents = serde_json::from_value(json!({
            "events": [{"id": 1, "title": "T"}, 5, "x", null, {"id": 2}],
            "results_available": 5,
        }))
        .unwrap();

        let ids: Vec<_> = events.events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
        assert_eq!(events.results_available, Some(5));
    }

    #[test]
    fn non_object_body_is_empty_result() {
        for body in [json!(null), json!([]), json!([{"id": 1}]), json!("text"), json!(3)] {
            assert_eq!(UpstreamEvents::from_body(body), UpstreamEvents::default());
        }

        let events = UpstreamEvents::from_body(json!({"events": [{"id": 4}]}));
        assert_eq!(events.events.len(), 1);
    }

    #[test]
    fn detail_flattens_group_title() {
        let event: UpstreamEvent = serde_json::from_value(json!({
            "id": 7,
            "group": {"id": 3, "title": "Shingen.py", "subdomain": "shingenpy"},
        }))
        .unwrap();

        let detail = EventDetail::from(event);
        assert_eq!(detail.group.as_deref(), Some("Shingen.py"));
    }

    #[test]
    fn summary_serializes_nulls() {
        let summary = EventSummary::from(UpstreamEvent {
            id: Some(1),
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(summary).unwrap(),
            json!({"id": 1, "title": null, "url": null, "started_at": null, "place": null})
        );
    }

    #[test]
    fn filter_defaults() {
        let filter: EventFilter = serde_json::from_value(json!({})).unwrap();
        assert_eq!(filter.keyword, "");
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.prefecture, None);
        assert_eq!(filter.subdomain, None);
    }

    #[test]
    fn filter_maps_to_keyword_query() {
        let filter: EventFilter =
            serde_json::from_value(json!({"keyword": "foo", "limit": 5})).unwrap();
        assert_eq!(EventQuery::from(filter), EventQuery::by_keyword("foo", 5));
    }
}
