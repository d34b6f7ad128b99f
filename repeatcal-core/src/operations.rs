//! Event operations exposed to the caller (CLI, UI controller).
//!
//! `EventOperations` keeps a local copy of the store's events. Every save or
//! delete is followed by a full refresh instead of patching the copy from
//! partial responses.

use chrono::NaiveDate;

use crate::error::{CalError, CalResult};
use crate::event::{EventId, EventPatch, EventSeed, Occurrence, SeriesId};
use crate::reconcile::SeriesEdit;
use crate::recurrence::generate;
use crate::store::EventStore;

/// What the caller hands to `save`.
#[derive(Debug, Clone)]
pub enum EventData {
    /// Not persisted yet
    New(EventSeed),
    /// Edited copy of a persisted occurrence
    Existing(Occurrence),
}

pub struct EventOperations<S> {
    store: S,
    events: Vec<Occurrence>,
    repeat_end_limit: Option<NaiveDate>,
}

impl<S: EventStore> EventOperations<S> {
    pub fn new(store: S) -> Self {
        EventOperations {
            store,
            events: Vec::new(),
            repeat_end_limit: None,
        }
    }

    /// Reject recurring events whose end date is after `limit`.
    pub fn with_repeat_end_limit(mut self, limit: Option<NaiveDate>) -> Self {
        self.repeat_end_limit = limit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Events as of the last refresh.
    pub fn events(&self) -> &[Occurrence] {
        &self.events
    }

    pub fn find(&self, id: &EventId) -> Option<&Occurrence> {
        self.events.iter().find(|e| e.id == *id)
    }

    /// Re-fetch every event. On failure the local copy is left as it was.
    pub async fn refresh(&mut self) -> CalResult<&[Occurrence]> {
        match self.store.list_events().await {
            Ok(events) => {
                self.events = events;
                Ok(&self.events)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch events");
                Err(match err {
                    CalError::FetchFailed(_) => err,
                    other => CalError::FetchFailed(other.to_string()),
                })
            }
        }
    }

    /// Create or edit an event.
    ///
    /// `whole_series` only matters for an existing occurrence that belongs to
    /// a series; otherwise the edit applies to that occurrence alone.
    pub async fn save(&mut self, data: EventData, whole_series: bool) -> CalResult<()> {
        let result = match data {
            EventData::New(seed) => self.create(seed).await,
            EventData::Existing(edited) => match edited.series_id().cloned() {
                Some(series_id) if whole_series => self.edit_series(&edited, &series_id).await,
                _ => self.edit_single(&edited).await,
            },
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to save event");
            self.resync().await;
            return Err(err.into_save_failure());
        }

        tracing::info!("event saved");
        self.refresh().await?;
        Ok(())
    }

    pub async fn delete(&mut self, id: &EventId) -> CalResult<()> {
        if let Err(err) = self.store.delete_event(id).await {
            tracing::warn!(id = %id, error = %err, "failed to delete event");
            self.resync().await;
            return Err(err.into_delete_failure());
        }

        tracing::info!(id = %id, "event deleted");
        self.refresh().await?;
        Ok(())
    }

    pub async fn delete_series(&mut self, series_id: &SeriesId) -> CalResult<()> {
        if let Err(err) = self.store.delete_series(series_id).await {
            tracing::warn!(series = %series_id, error = %err, "failed to delete series");
            self.resync().await;
            return Err(err.into_delete_failure());
        }

        tracing::info!(series = %series_id, "series deleted");
        self.refresh().await?;
        Ok(())
    }

    /// Refresh after a failed write, which may have been partly applied.
    /// The write's error is what the caller gets, so a refresh error is dropped.
    async fn resync(&mut self) {
        let _ = self.refresh().await;
    }

    async fn create(&self, seed: EventSeed) -> CalResult<()> {
        if seed.repeat.is_recurring() {
            let batch = self.expand(&seed)?;
            tracing::info!(count = batch.len(), kind = %seed.repeat.kind(), "creating series");
            self.store.create_events(batch).await?;
        } else {
            self.store.create_event(seed).await?;
        }
        Ok(())
    }

    /// Apply the edit to every occurrence of `series_id`.
    async fn edit_series(&self, edited: &Occurrence, series_id: &SeriesId) -> CalResult<()> {
        let series: Vec<Occurrence> = self
            .events
            .iter()
            .filter(|e| e.belongs_to(series_id))
            .cloned()
            .collect();

        let reference = self
            .find(&edited.id)
            .or_else(|| series.first())
            .filter(|_| !series.is_empty())
            .ok_or_else(|| CalError::NotFound(format!("Recurring series {series_id}")))?;

        match SeriesEdit::classify(&edited.seed, &reference.seed) {
            SeriesEdit::MetadataOnly(patch) => {
                tracing::info!(series = %series_id, "updating series metadata");
                self.store.update_series(series_id, patch).await?;
            }
            SeriesEdit::TemporalShift(shift) => {
                let end_date = reference.seed.repeat.end_date();
                let plan = shift.plan(series_id, &series, end_date);
                tracing::info!(
                    series = %series_id,
                    delta_days = shift.date_delta_days,
                    occurrences = series.len(),
                    updates = plan.to_update.len(),
                    deletions = plan.to_delete.len(),
                    "retiming series"
                );
                self.store.reconcile_series(plan).await?;
            }
        }
        Ok(())
    }

    /// Apply the edit to this occurrence only, taking it out of its series.
    async fn edit_single(&self, edited: &Occurrence) -> CalResult<()> {
        if edited.seed.repeat.is_recurring() {
            let mut seed = edited.seed.clone();
            seed.repeat = seed.repeat.detached();
            let batch = self.expand(&seed)?;

            tracing::info!(id = %edited.id, count = batch.len(), "replacing event with new series");
            self.store.delete_event(&edited.id).await?;
            self.store.create_events(batch).await?;
        } else {
            self.store
                .update_event(&edited.id, EventPatch::from(&edited.seed))
                .await?;
        }
        Ok(())
    }

    /// Expand a recurring seed, refusing anything that would persist nothing.
    fn expand(&self, seed: &EventSeed) -> CalResult<Vec<EventSeed>> {
        if let (Some(limit), Some(end)) = (self.repeat_end_limit, seed.repeat.end_date()) {
            if end > limit {
                return Err(CalError::InvalidEvent(format!(
                    "Repeat end date {end} is after the allowed limit {limit}"
                )));
            }
        }

        let batch = generate(seed);
        if batch.is_empty() {
            return Err(CalError::InvalidEvent(format!(
                "Recurring event '{}' has no occurrences; it needs an end date on or after {}",
                seed.title, seed.date
            )));
        }
        Ok(batch)
    }
}
