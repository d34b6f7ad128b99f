//! In-process event store.
//!
//! Each `MemoryStore` owns its own state; clones share it. The initial events
//! are kept so `reset` can put the store back where it started.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{CalError, CalResult};
use crate::event::{EventId, EventPatch, EventSeed, Occurrence, SeriesId, SeriesPatch};
use crate::reconcile::SeriesPlan;
use crate::store::EventStore;

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    initial: Vec<Occurrence>,
    events: RwLock<Vec<Occurrence>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `initial`, which `reset` restores.
    pub fn with_events(initial: Vec<Occurrence>) -> Self {
        MemoryStore {
            inner: Arc::new(Inner {
                events: RwLock::new(initial.clone()),
                initial,
            }),
        }
    }

    /// Drop every change since construction.
    pub async fn reset(&self) {
        *self.inner.events.write().await = self.inner.initial.clone();
    }

    pub async fn snapshot(&self) -> Vec<Occurrence> {
        self.inner.events.read().await.clone()
    }

    fn assign(mut seed: EventSeed, series_id: Option<&SeriesId>) -> Occurrence {
        if seed.repeat.is_recurring() {
            seed.repeat.set_series_id(series_id.cloned());
        }
        Occurrence::new(EventId::generate(), seed)
    }
}

fn event_not_found(id: &EventId) -> CalError {
    CalError::NotFound(format!("Event {id}"))
}

fn series_not_found(series_id: &SeriesId) -> CalError {
    CalError::NotFound(format!("Recurring series {series_id}"))
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events(&self) -> CalResult<Vec<Occurrence>> {
        Ok(self.snapshot().await)
    }

    async fn create_event(&self, seed: EventSeed) -> CalResult<Occurrence> {
        let series_id = seed.repeat.is_recurring().then(SeriesId::generate);
        let occurrence = Self::assign(seed, series_id.as_ref());

        self.inner.events.write().await.push(occurrence.clone());
        Ok(occurrence)
    }

    async fn create_events(&self, batch: Vec<EventSeed>) -> CalResult<Vec<Occurrence>> {
        let series_id = batch
            .iter()
            .any(|seed| seed.repeat.is_recurring())
            .then(SeriesId::generate);

        let created: Vec<Occurrence> = batch
            .into_iter()
            .map(|seed| Self::assign(seed, series_id.as_ref()))
            .collect();

        tracing::debug!(count = created.len(), series = ?series_id, "created event batch");
        self.inner.events.write().await.extend(created.iter().cloned());
        Ok(created)
    }

    async fn update_event(&self, id: &EventId, patch: EventPatch) -> CalResult<Occurrence> {
        let mut events = self.inner.events.write().await;
        let event = events
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| event_not_found(id))?;

        patch.apply(&mut event.seed);
        Ok(event.clone())
    }

    async fn update_events(&self, batch: Vec<Occurrence>) -> CalResult<Vec<Occurrence>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut events = self.inner.events.write().await;
        let mut updated = Vec::new();

        for replacement in batch {
            if let Some(event) = events.iter_mut().find(|e| e.id == replacement.id) {
                *event = replacement;
                updated.push(event.clone());
            }
        }

        if updated.is_empty() {
            return Err(CalError::NotFound("None of the listed events exist".into()));
        }
        Ok(updated)
    }

    async fn delete_event(&self, id: &EventId) -> CalResult<()> {
        let mut events = self.inner.events.write().await;
        let index = events
            .iter()
            .position(|e| e.id == *id)
            .ok_or_else(|| event_not_found(id))?;

        events.remove(index);
        Ok(())
    }

    async fn delete_events(&self, ids: Vec<EventId>) -> CalResult<()> {
        let ids: HashSet<EventId> = ids.into_iter().collect();
        self.inner
            .events
            .write()
            .await
            .retain(|e| !ids.contains(&e.id));
        Ok(())
    }

    async fn update_series(
        &self,
        series_id: &SeriesId,
        patch: SeriesPatch,
    ) -> CalResult<Vec<Occurrence>> {
        let mut events = self.inner.events.write().await;
        let mut updated = Vec::new();

        for event in events.iter_mut().filter(|e| e.belongs_to(series_id)) {
            patch.apply(&mut event.seed);
            updated.push(event.clone());
        }

        if updated.is_empty() {
            return Err(series_not_found(series_id));
        }
        Ok(updated)
    }

    async fn delete_series(&self, series_id: &SeriesId) -> CalResult<()> {
        let mut events = self.inner.events.write().await;
        let before = events.len();
        events.retain(|e| !e.belongs_to(series_id));

        if events.len() == before {
            return Err(series_not_found(series_id));
        }
        Ok(())
    }

    /// Both halves land under one write lock, or neither does.
    async fn reconcile_series(&self, plan: SeriesPlan) -> CalResult<Vec<Occurrence>> {
        let mut events = self.inner.events.write().await;

        if let Some(missing) = plan
            .to_update
            .iter()
            .find(|u| !events.iter().any(|e| e.id == u.id))
        {
            return Err(event_not_found(&missing.id));
        }

        for replacement in &plan.to_update {
            if let Some(event) = events.iter_mut().find(|e| e.id == replacement.id) {
                *event = replacement.clone();
            }
        }

        let doomed: HashSet<&EventId> = plan.to_delete.iter().collect();
        events.retain(|e| !doomed.contains(&e.id));

        tracing::debug!(
            series = %plan.series_id,
            updated = plan.to_update.len(),
            deleted = plan.to_delete.len(),
            "reconciled series"
        );
        Ok(plan.to_update)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::event::{Recurrence, RepeatRule};

    fn seed(title: &str, day: u32) -> EventSeed {
        EventSeed::new(
            title,
            NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    fn weekly(title: &str, day: u32) -> EventSeed {
        let mut s = seed(title, day);
        s.repeat = RepeatRule::Weekly(Recurrence::new(
            NonZeroU32::new(1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 30),
        ));
        s
    }

    #[tokio::test]
    async fn test_create_single_event_assigns_id_without_series() {
        let store = MemoryStore::new();
        let created = store.create_event(seed("Dentist", 10)).await.unwrap();

        assert!(!created.id.as_str().is_empty());
        assert_eq!(created.series_id(), None);
        assert_eq!(store.snapshot().await, vec![created]);
    }

    #[tokio::test]
    async fn test_create_batch_shares_fresh_series_id() {
        let store = MemoryStore::new();
        let first = store
            .create_events(vec![weekly("Sync", 1), weekly("Sync", 8)])
            .await
            .unwrap();
        let second = store.create_events(vec![weekly("Other", 2)]).await.unwrap();

        let series = first[0].series_id().cloned().unwrap();
        assert!(series.as_str().starts_with("repeat-"));
        assert_eq!(first[1].series_id(), Some(&series));
        assert_ne!(second[0].series_id(), Some(&series));
        assert_ne!(first[0].id, first[1].id);
    }

    #[tokio::test]
    async fn test_reset_restores_seeded_events() {
        let initial = vec![Occurrence::new(EventId::from("1"), seed("Seeded", 3))];
        let store = MemoryStore::with_events(initial.clone());

        store.create_event(seed("Extra", 4)).await.unwrap();
        store.delete_event(&EventId::from("1")).await.unwrap();
        store.reset().await;

        assert_eq!(store.snapshot().await, initial);
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_event(&EventId::from("999"), EventPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CalError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_series_touches_only_members() {
        let store = MemoryStore::new();
        let members = store
            .create_events(vec![weekly("Sync", 1), weekly("Sync", 8)])
            .await
            .unwrap();
        let loner = store.create_event(seed("Lunch", 1)).await.unwrap();
        let series = members[0].series_id().cloned().unwrap();

        let patch = SeriesPatch {
            title: Some("Team sync".into()),
            ..SeriesPatch::default()
        };
        let updated = store.update_series(&series, patch).await.unwrap();

        assert_eq!(updated.len(), 2);
        let events = store.snapshot().await;
        let lunch = events.iter().find(|e| e.id == loner.id).unwrap();
        assert_eq!(lunch.seed.title, "Lunch");
        assert!(events
            .iter()
            .filter(|e| e.belongs_to(&series))
            .all(|e| e.seed.title == "Team sync"));
    }

    #[tokio::test]
    async fn test_series_operations_on_unknown_series_are_not_found() {
        let store = MemoryStore::new();
        let unknown = SeriesId::from("repeat-missing");

        assert!(matches!(
            store.update_series(&unknown, SeriesPatch::default()).await,
            Err(CalError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_series(&unknown).await,
            Err(CalError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_series_removes_all_members() {
        let store = MemoryStore::new();
        let members = store
            .create_events(vec![weekly("Sync", 1), weekly("Sync", 8)])
            .await
            .unwrap();
        store.create_event(seed("Lunch", 1)).await.unwrap();

        store
            .delete_series(members[0].series_id().unwrap())
            .await
            .unwrap();

        let remaining = store.snapshot().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].seed.title, "Lunch");
    }

    #[tokio::test]
    async fn test_reconcile_with_unknown_update_applies_nothing() {
        let store = MemoryStore::new();
        let members = store
            .create_events(vec![weekly("Sync", 1), weekly("Sync", 8)])
            .await
            .unwrap();
        let before = store.snapshot().await;

        let mut ghost = members[0].clone();
        ghost.id = EventId::from("ghost");
        let plan = SeriesPlan {
            series_id: members[0].series_id().cloned().unwrap(),
            to_update: vec![ghost],
            to_delete: vec![members[1].id.clone()],
        };

        assert!(matches!(
            store.reconcile_series(plan).await,
            Err(CalError::NotFound(_))
        ));
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_reconcile_applies_updates_and_deletions() {
        let store = MemoryStore::new();
        let members = store
            .create_events(vec![weekly("Sync", 1), weekly("Sync", 8)])
            .await
            .unwrap();

        let mut moved = members[0].clone();
        moved.seed.date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        let plan = SeriesPlan {
            series_id: members[0].series_id().cloned().unwrap(),
            to_update: vec![moved.clone()],
            to_delete: vec![members[1].id.clone()],
        };

        store.reconcile_series(plan).await.unwrap();
        assert_eq!(store.snapshot().await, vec![moved]);
    }
}
