//! HTTP protocol types.
//!
//! Defines the JSON bodies exchanged between `HttpStore` and repeatcal-server,
//! plus the route table both sides agree on.

use serde::{Deserialize, Serialize};

use crate::event::{EventId, Occurrence};

/// Route templates, in axum's `{param}` syntax.
pub mod routes {
    pub const EVENTS: &str = "/api/events";
    pub const EVENT: &str = "/api/events/{id}";
    pub const EVENTS_LIST: &str = "/api/events-list";
    pub const SERIES: &str = "/api/recurring-events/{id}";
    pub const SERIES_RECONCILE: &str = "/api/recurring-events/{id}/reconcile";
}

/// `{ "events": [...] }`, used for listings and batch bodies alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBatch<T> {
    pub events: Vec<T>,
}

impl<T> EventBatch<T> {
    pub fn new(events: Vec<T>) -> Self {
        EventBatch { events }
    }
}

/// Body of `DELETE /api/events-list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventsRequest {
    pub event_ids: Vec<EventId>,
}

/// Body of `POST /api/recurring-events/{id}/reconcile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileRequest {
    #[serde(default)]
    pub updates: Vec<Occurrence>,
    #[serde(default)]
    pub deletions: Vec<EventId>,
}

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
