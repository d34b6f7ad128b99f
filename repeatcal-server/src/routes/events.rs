//! Single-event and batch endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use repeatcal_core::protocol::{DeleteEventsRequest, EventBatch, routes};
use repeatcal_core::store::EventStore;
use repeatcal_core::{EventId, EventPatch, EventSeed, Occurrence};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(routes::EVENTS, get(list_events).post(create_event))
        .route(routes::EVENT, put(update_event).delete(delete_event))
        .route(
            routes::EVENTS_LIST,
            put(update_events).post(create_events).delete(delete_events),
        )
}

/// GET /api/events - List every event
async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<EventBatch<Occurrence>>, AppError> {
    let events = state.store.list_events().await?;
    Ok(Json(EventBatch::new(events)))
}

/// POST /api/events - Create one event
async fn create_event(
    State(state): State<AppState>,
    Json(seed): Json<EventSeed>,
) -> Result<(StatusCode, Json<Occurrence>), AppError> {
    let created = state.store.create_event(seed).await?;
    tracing::info!(id = %created.id, "created event");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/events/:id - Merge a partial update into one event
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<Occurrence>, AppError> {
    let updated = state.store.update_event(&EventId(id), patch).await?;
    Ok(Json(updated))
}

/// DELETE /api/events/:id
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_event(&EventId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/events-list - Create a batch; recurring members share one series id
async fn create_events(
    State(state): State<AppState>,
    Json(batch): Json<EventBatch<EventSeed>>,
) -> Result<(StatusCode, Json<Vec<Occurrence>>), AppError> {
    let created = state.store.create_events(batch.events).await?;
    tracing::info!(count = created.len(), "created event batch");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/events-list - Replace existing events by id
async fn update_events(
    State(state): State<AppState>,
    Json(batch): Json<EventBatch<Occurrence>>,
) -> Result<Json<Vec<Occurrence>>, AppError> {
    let updated = state.store.update_events(batch.events).await?;
    Ok(Json(updated))
}

/// DELETE /api/events-list
async fn delete_events(
    State(state): State<AppState>,
    Json(req): Json<DeleteEventsRequest>,
) -> Result<StatusCode, AppError> {
    state.store.delete_events(req.event_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}
