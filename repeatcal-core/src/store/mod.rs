//! Event store abstraction.
//!
//! The core never talks to persistence directly. Everything goes through
//! `EventStore`, which hides whether events live in process memory
//! (`MemoryStore`) or behind the HTTP contract (`HttpStore`).

mod http;
mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::CalResult;
use crate::event::{EventId, EventPatch, EventSeed, Occurrence, SeriesId, SeriesPatch};
use crate::reconcile::SeriesPlan;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list_events(&self) -> CalResult<Vec<Occurrence>>;

    /// Persist one event. A recurring seed gets its own fresh series id.
    async fn create_event(&self, seed: EventSeed) -> CalResult<Occurrence>;

    /// Persist a batch. Every recurring member shares one fresh series id.
    async fn create_events(&self, batch: Vec<EventSeed>) -> CalResult<Vec<Occurrence>>;

    /// Merge `patch` into the event. `NotFound` if the id is absent.
    async fn update_event(&self, id: &EventId, patch: EventPatch) -> CalResult<Occurrence>;

    /// Replace every listed event that exists. `NotFound` if none did.
    async fn update_events(&self, batch: Vec<Occurrence>) -> CalResult<Vec<Occurrence>>;

    /// `NotFound` if the id is absent.
    async fn delete_event(&self, id: &EventId) -> CalResult<()>;

    /// Remove every listed event. Unknown ids are ignored.
    async fn delete_events(&self, ids: Vec<EventId>) -> CalResult<()>;

    /// Merge `patch` into every member of the series. `NotFound` if it has none.
    async fn update_series(
        &self,
        series_id: &SeriesId,
        patch: SeriesPatch,
    ) -> CalResult<Vec<Occurrence>>;

    /// Remove every member of the series. `NotFound` if it has none.
    async fn delete_series(&self, series_id: &SeriesId) -> CalResult<()>;

    /// Apply a whole-series retime as one logical call.
    ///
    /// The default issues the update batch and, once it has resolved, the
    /// delete batch. Stores that can apply both halves atomically override it.
    async fn reconcile_series(&self, plan: SeriesPlan) -> CalResult<Vec<Occurrence>> {
        let SeriesPlan {
            series_id,
            to_update,
            to_delete,
        } = plan;

        let updated = if to_update.is_empty() {
            Vec::new()
        } else {
            tracing::debug!(series = %series_id, count = to_update.len(), "updating series batch");
            self.update_events(to_update).await?
        };

        if !to_delete.is_empty() {
            tracing::debug!(series = %series_id, count = to_delete.len(), "deleting series batch");
            self.delete_events(to_delete).await?;
        }

        Ok(updated)
    }
}
