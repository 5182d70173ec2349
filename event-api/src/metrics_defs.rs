//! Metrics definitions for the event API.

use shared::metrics_defs::{MetricDef, MetricType};

pub const UPSTREAM_REQUESTS: MetricDef = MetricDef {
    name: "upstream.requests",
    metric_type: MetricType::Counter,
    description: "Number of requests sent to the upstream events API. Tagged with outcome.",
};

pub const UPSTREAM_REQUEST_DURATION: MetricDef = MetricDef {
    name: "upstream.request.duration",
    metric_type: MetricType::Histogram,
    description: "Upstream events API request duration in seconds. Tagged with outcome.",
};

pub const EVENTS_RETURNED: MetricDef = MetricDef {
    name: "events.returned",
    metric_type: MetricType::Histogram,
    description: "Number of events returned by list endpoints. Tagged with endpoint.",
};

pub const ALL_METRICS: &[MetricDef] = &[UPSTREAM_REQUESTS, UPSTREAM_REQUEST_DURATION, EVENTS_RETURNED];
