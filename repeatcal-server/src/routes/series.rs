//! Recurring series endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use repeatcal_core::protocol::{ReconcileRequest, routes};
use repeatcal_core::reconcile::SeriesPlan;
use repeatcal_core::store::EventStore;
use repeatcal_core::{Occurrence, SeriesId, SeriesPatch};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(routes::SERIES, put(update_series).delete(delete_series))
        .route(routes::SERIES_RECONCILE, post(reconcile_series))
}

/// PUT /api/recurring-events/:id - Patch every member's metadata
async fn update_series(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<SeriesPatch>,
) -> Result<Json<Vec<Occurrence>>, AppError> {
    let updated = state.store.update_series(&SeriesId(id), patch).await?;
    Ok(Json(updated))
}

/// DELETE /api/recurring-events/:id - Remove every member
async fn delete_series(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let series_id = SeriesId(id);
    state.store.delete_series(&series_id).await?;
    tracing::info!(series = %series_id, "deleted series");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recurring-events/:id/reconcile - Apply a retime atomically
async fn reconcile_series(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReconcileRequest>,
) -> Result<Json<Vec<Occurrence>>, AppError> {
    let plan = SeriesPlan {
        series_id: SeriesId(id),
        to_update: req.updates,
        to_delete: req.deletions,
    };
    let updated = state.store.reconcile_series(plan).await?;
    Ok(Json(updated))
}
