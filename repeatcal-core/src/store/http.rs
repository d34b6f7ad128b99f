//! HTTP event store, talking to repeatcal-server (or anything speaking the
//! same contract).

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{CalError, CalResult};
use crate::event::{EventId, EventPatch, EventSeed, Occurrence, SeriesId, SeriesPatch};
use crate::protocol::{
    DeleteEventsRequest, ErrorResponse, EventBatch, ReconcileRequest, routes,
};
use crate::reconcile::SeriesPlan;
use crate::store::EventStore;

/// HTTP client for the event store contract
pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
}

/// Which failure kind a non-success status maps to.
#[derive(Clone, Copy)]
enum Op {
    Fetch,
    Save,
    Delete,
}

impl Op {
    fn failure(self, message: String) -> CalError {
        match self {
            Op::Fetch => CalError::FetchFailed(message),
            Op::Save => CalError::SaveFailed(message),
            Op::Delete => CalError::DeleteFailed(message),
        }
    }
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpStore { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a route template. `{id}` becomes a single
    /// percent-encoded path segment.
    fn url(&self, template: &str, id: Option<&str>, op: Op) -> CalResult<Url> {
        let invalid =
            |reason: String| op.failure(format!("Invalid server URL '{}': {reason}", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("it cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(template.trim_start_matches('/').split('/').map(|segment| {
                match (segment, id) {
                    ("{id}", Some(id)) => id,
                    _ => segment,
                }
            }));
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, op: Op) -> CalResult<Response> {
        let resp = request
            .send()
            .await
            .map_err(|e| op.failure(format!("Failed to connect to server: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = error_message(resp).await;
        if status == StatusCode::NOT_FOUND {
            return Err(CalError::NotFound(message));
        }
        Err(op.failure(format!("{status}: {message}")))
    }
}

/// Prefer the server's `{ "error": ... }` body, fall back to raw text.
async fn error_message(resp: Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => err.error,
        Err(_) if !body.trim().is_empty() => body,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> CalResult<T> {
    resp.json()
        .await
        .map_err(|e| CalError::Serialization(format!("Failed to parse response: {e}")))
}

#[async_trait]
impl EventStore for HttpStore {
    /// GET /api/events
    async fn list_events(&self) -> CalResult<Vec<Occurrence>> {
        let resp = self
            .send(self.http.get(self.url(routes::EVENTS, None, Op::Fetch)?), Op::Fetch)
            .await?;
        let batch: EventBatch<Occurrence> = decode(resp).await?;
        Ok(batch.events)
    }

    /// POST /api/events
    async fn create_event(&self, seed: EventSeed) -> CalResult<Occurrence> {
        let request = self.http.post(self.url(routes::EVENTS, None, Op::Save)?).json(&seed);
        decode(self.send(request, Op::Save).await?).await
    }

    /// POST /api/events-list
    async fn create_events(&self, batch: Vec<EventSeed>) -> CalResult<Vec<Occurrence>> {
        let request = self
            .http
            .post(self.url(routes::EVENTS_LIST, None, Op::Save)?)
            .json(&EventBatch::new(batch));
        decode(self.send(request, Op::Save).await?).await
    }

    /// PUT /api/events/{id}
    async fn update_event(&self, id: &EventId, patch: EventPatch) -> CalResult<Occurrence> {
        let request = self
            .http
            .put(self.url(routes::EVENT, Some(id.as_str()), Op::Save)?)
            .json(&patch);
        decode(self.send(request, Op::Save).await?).await
    }

    /// PUT /api/events-list
    async fn update_events(&self, batch: Vec<Occurrence>) -> CalResult<Vec<Occurrence>> {
        let request = self
            .http
            .put(self.url(routes::EVENTS_LIST, None, Op::Save)?)
            .json(&EventBatch::new(batch));
        decode(self.send(request, Op::Save).await?).await
    }

    /// DELETE /api/events/{id}
    async fn delete_event(&self, id: &EventId) -> CalResult<()> {
        let request = self
            .http
            .delete(self.url(routes::EVENT, Some(id.as_str()), Op::Delete)?);
        self.send(request, Op::Delete).await?;
        Ok(())
    }

    /// DELETE /api/events-list
    async fn delete_events(&self, ids: Vec<EventId>) -> CalResult<()> {
        let request = self
            .http
            .delete(self.url(routes::EVENTS_LIST, None, Op::Delete)?)
            .json(&DeleteEventsRequest { event_ids: ids });
        self.send(request, Op::Delete).await?;
        Ok(())
    }

    /// PUT /api/recurring-events/{id}
    async fn update_series(
        &self,
        series_id: &SeriesId,
        patch: SeriesPatch,
    ) -> CalResult<Vec<Occurrence>> {
        let request = self
            .http
            .put(self.url(routes::SERIES, Some(series_id.as_str()), Op::Save)?)
            .json(&patch);
        decode(self.send(request, Op::Save).await?).await
    }

    /// DELETE /api/recurring-events/{id}
    async fn delete_series(&self, series_id: &SeriesId) -> CalResult<()> {
        let request = self
            .http
            .delete(self.url(routes::SERIES, Some(series_id.as_str()), Op::Delete)?);
        self.send(request, Op::Delete).await?;
        Ok(())
    }

    /// POST /api/recurring-events/{id}/reconcile
    async fn reconcile_series(&self, plan: SeriesPlan) -> CalResult<Vec<Occurrence>> {
        let body = ReconcileRequest {
            updates: plan.to_update,
            deletions: plan.to_delete,
        };
        let request = self
            .http
            .post(self.url(
                routes::SERIES_RECONCILE,
                Some(plan.series_id.as_str()),
                Op::Save,
            )?)
            .json(&body);
        decode(self.send(request, Op::Save).await?).await
    }
}
