use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use repeatcal_core::operations::{EventData, EventOperations};
use repeatcal_core::reconcile::SeriesPlan;
use repeatcal_core::store::{EventStore, MemoryStore};
use repeatcal_core::{
    CalError, CalResult, EventId, EventPatch, EventSeed, Occurrence, Recurrence, RepeatRule,
    SeriesId, SeriesPatch,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn single(title: &str, day: u32) -> EventSeed {
    EventSeed::new(title, date(2025, 11, day), time(9, 0), time(10, 0))
}

fn weekly(title: &str, day: u32, end: Option<NaiveDate>) -> EventSeed {
    let mut seed = EventSeed::new(title, date(2025, 11, day), time(10, 0), time(11, 0));
    seed.location = "Room A".into();
    seed.repeat = RepeatRule::Weekly(Recurrence::new(NonZeroU32::new(1).unwrap(), end));
    seed
}

fn member(id: &str, day: u32) -> Occurrence {
    let mut seed = weekly("Weekly sync", day, Some(date(2025, 11, 30)));
    seed.repeat.set_series_id(Some(SeriesId::from("repeat-456")));
    Occurrence::new(EventId::from(id), seed)
}

/// Weekly series on Nov 8, 15 and 22 ending Nov 30, plus one single event.
fn fixture() -> Vec<Occurrence> {
    vec![
        member("1", 8),
        member("2", 15),
        member("3", 22),
        Occurrence::new(EventId::from("single-1"), single("Dentist", 10)),
    ]
}

/// Wraps `MemoryStore`, records every call and keeps the default
/// `reconcile_series`.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl RecordingStore {
    fn with_events(events: Vec<Occurrence>) -> Self {
        RecordingStore {
            inner: MemoryStore::with_events(events),
            ..RecordingStore::default()
        }
    }

    fn fail(self, op: &'static str) -> Self {
        self.failing.lock().unwrap().insert(op);
        self
    }

    fn record(&self, call: &str) -> CalResult<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.failing.lock().unwrap().contains(call) {
            return Err(CalError::FetchFailed(format!("{call}: store unavailable")));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than refreshes.
    fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c != "list_events")
            .collect()
    }
}

#[async_trait]
impl EventStore for RecordingStore {
    async fn list_events(&self) -> CalResult<Vec<Occurrence>> {
        self.record("list_events")?;
        self.inner.list_events().await
    }

    async fn create_event(&self, seed: EventSeed) -> CalResult<Occurrence> {
        self.record("create_event")?;
        self.inner.create_event(seed).await
    }

    async fn create_events(&self, batch: Vec<EventSeed>) -> CalResult<Vec<Occurrence>> {
        self.record("create_events")?;
        self.inner.create_events(batch).await
    }

    async fn update_event(&self, id: &EventId, patch: EventPatch) -> CalResult<Occurrence> {
        self.record("update_event")?;
        self.inner.update_event(id, patch).await
    }

    async fn update_events(&self, batch: Vec<Occurrence>) -> CalResult<Vec<Occurrence>> {
        self.record("update_events")?;
        tokio::task::yield_now().await;
        let updated = self.inner.update_events(batch).await;
        self.calls.lock().unwrap().push("update_events:done".into());
        updated
    }

    async fn delete_event(&self, id: &EventId) -> CalResult<()> {
        self.record("delete_event")?;
        self.inner.delete_event(id).await
    }

    async fn delete_events(&self, ids: Vec<EventId>) -> CalResult<()> {
        self.record("delete_events")?;
        self.inner.delete_events(ids).await
    }

    async fn update_series(
        &self,
        series_id: &SeriesId,
        patch: SeriesPatch,
    ) -> CalResult<Vec<Occurrence>> {
        self.record("update_series")?;
        self.inner.update_series(series_id, patch).await
    }

    async fn delete_series(&self, series_id: &SeriesId) -> CalResult<()> {
        self.record("delete_series")?;
        self.inner.delete_series(series_id).await
    }
}

async fn loaded(store: RecordingStore) -> EventOperations<RecordingStore> {
    let mut ops = EventOperations::new(store);
    ops.refresh().await.unwrap();
    ops
}

fn dated(events: &[Occurrence], id: &str) -> NaiveDate {
    events
        .iter()
        .find(|e| e.id.as_str() == id)
        .map(|e| e.seed.date)
        .unwrap()
}

#[tokio::test]
async fn test_create_single_event_refreshes_cache() {
    let mut ops = loaded(RecordingStore::default()).await;

    ops.save(EventData::New(single("Dentist", 10)), false)
        .await
        .unwrap();

    assert_eq!(ops.events().len(), 1);
    assert_eq!(ops.events()[0].series_id(), None);
    assert_eq!(
        ops.store().calls(),
        vec!["list_events", "create_event", "list_events"]
    );
}

#[tokio::test]
async fn test_create_recurring_event_persists_one_series() {
    let mut ops = loaded(RecordingStore::default()).await;

    ops.save(
        EventData::New(weekly("Weekly sync", 1, Some(date(2025, 11, 30)))),
        false,
    )
    .await
    .unwrap();

    let events = ops.events();
    let dates: Vec<_> = events.iter().map(|e| e.seed.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2025, 11, 1),
            date(2025, 11, 8),
            date(2025, 11, 15),
            date(2025, 11, 22),
            date(2025, 11, 29),
        ]
    );

    let series = events[0].series_id().cloned().unwrap();
    assert!(events.iter().all(|e| e.belongs_to(&series)));
    assert_eq!(ops.store().writes(), vec!["create_events"]);
}

#[tokio::test]
async fn test_recurring_event_without_end_date_is_rejected() {
    let mut ops = loaded(RecordingStore::default()).await;

    let err = ops
        .save(EventData::New(weekly("Open ended", 1, None)), false)
        .await
        .unwrap_err();

    assert!(matches!(err, CalError::InvalidEvent(_)));
    assert!(ops.store().writes().is_empty());
}

#[tokio::test]
async fn test_end_date_past_limit_is_rejected() {
    let store = RecordingStore::default();
    let mut ops = EventOperations::new(store).with_repeat_end_limit(Some(date(2025, 12, 31)));

    let err = ops
        .save(
            EventData::New(weekly("Too long", 1, Some(date(2026, 2, 1)))),
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CalError::InvalidEvent(_)));
    assert!(ops.store().writes().is_empty());
}

#[tokio::test]
async fn test_series_metadata_edit_is_one_update_series_call() {
    let mut ops = loaded(RecordingStore::with_events(fixture())).await;

    let mut edited = ops.find(&EventId::from("2")).cloned().unwrap();
    edited.seed.title = "Team sync".into();
    edited.seed.location = "Room B".into();
    ops.save(EventData::Existing(edited), true).await.unwrap();

    assert_eq!(ops.store().writes(), vec!["update_series"]);

    let members: Vec<_> = ops
        .events()
        .iter()
        .filter(|e| e.belongs_to(&SeriesId::from("repeat-456")))
        .collect();
    assert_eq!(members.len(), 3);
    assert!(members
        .iter()
        .all(|e| e.seed.title == "Team sync" && e.seed.location == "Room B"));
    assert_eq!(dated(ops.events(), "1"), date(2025, 11, 8));
}

#[tokio::test]
async fn test_series_shift_updates_before_deleting() {
    let mut ops = loaded(RecordingStore::with_events(fixture())).await;

    let mut edited = ops.find(&EventId::from("1")).cloned().unwrap();
    edited.seed.date = date(2025, 11, 22);
    ops.save(EventData::Existing(edited), true).await.unwrap();

    assert_eq!(
        ops.store().writes(),
        vec!["update_events", "update_events:done", "delete_events"]
    );

    let events = ops.events();
    assert_eq!(dated(events, "1"), date(2025, 11, 22));
    assert_eq!(dated(events, "2"), date(2025, 11, 29));
    assert!(events.iter().all(|e| e.id.as_str() != "3"));
    assert_eq!(dated(events, "single-1"), date(2025, 11, 10));
}

#[tokio::test]
async fn test_series_time_change_retimes_every_member() {
    let store = MemoryStore::with_events(fixture());
    let mut ops = EventOperations::new(store);
    ops.refresh().await.unwrap();

    let mut edited = ops.find(&EventId::from("3")).cloned().unwrap();
    edited.seed.start_time = time(14, 0);
    edited.seed.end_time = time(15, 30);
    ops.save(EventData::Existing(edited), true).await.unwrap();

    let members: Vec<_> = ops
        .events()
        .iter()
        .filter(|e| e.belongs_to(&SeriesId::from("repeat-456")))
        .collect();
    assert_eq!(members.len(), 3);
    assert!(members
        .iter()
        .all(|e| e.seed.start_time == time(14, 0) && e.seed.end_time == time(15, 30)));
    assert_eq!(dated(ops.events(), "1"), date(2025, 11, 8));
}

#[tokio::test]
async fn test_failed_delete_half_keeps_applied_updates() {
    let store = RecordingStore::with_events(fixture()).fail("delete_events");
    let mut ops = loaded(store).await;

    let mut edited = ops.find(&EventId::from("1")).cloned().unwrap();
    edited.seed.date = date(2025, 11, 22);
    let err = ops.save(EventData::Existing(edited), true).await.unwrap_err();

    assert!(matches!(err, CalError::SaveFailed(_)));

    let persisted = ops.store().inner.snapshot().await;
    assert_eq!(dated(&persisted, "1"), date(2025, 11, 22));
    assert!(persisted.iter().any(|e| e.id.as_str() == "3"));
}

#[tokio::test]
async fn test_failed_save_refreshes_partially_applied_state() {
    let store = RecordingStore::with_events(fixture()).fail("delete_events");
    let mut ops = loaded(store).await;

    let mut edited = ops.find(&EventId::from("1")).cloned().unwrap();
    edited.seed.date = date(2025, 11, 22);
    let err = ops.save(EventData::Existing(edited), true).await.unwrap_err();

    assert!(matches!(err, CalError::SaveFailed(_)));
    assert_eq!(ops.store().calls().last().map(String::as_str), Some("list_events"));
    assert_eq!(dated(ops.events(), "1"), date(2025, 11, 22));
    assert_eq!(ops.events(), ops.store().inner.snapshot().await.as_slice());
}

#[tokio::test]
async fn test_single_edit_to_none_leaves_series() {
    let mut ops = loaded(RecordingStore::with_events(fixture())).await;

    let mut edited = ops.find(&EventId::from("2")).cloned().unwrap();
    edited.seed.title = "Moved one-off".into();
    edited.seed.date = date(2025, 11, 16);
    edited.seed.repeat = RepeatRule::None;
    ops.save(EventData::Existing(edited), false).await.unwrap();

    assert_eq!(ops.store().writes(), vec!["update_event"]);

    let moved = ops.find(&EventId::from("2")).unwrap();
    assert_eq!(moved.series_id(), None);
    assert_eq!(moved.seed.date, date(2025, 11, 16));

    let series = SeriesId::from("repeat-456");
    let rest: Vec<_> = ops.events().iter().filter(|e| e.belongs_to(&series)).collect();
    assert_eq!(rest.len(), 2);
    assert!(rest.iter().all(|e| e.seed.title == "Weekly sync"));
}

#[tokio::test]
async fn test_single_edit_of_recurring_event_starts_new_series() {
    let mut ops = loaded(RecordingStore::with_events(fixture())).await;

    let mut edited = ops.find(&EventId::from("3")).cloned().unwrap();
    edited.seed.title = "Split off".into();
    ops.save(EventData::Existing(edited), false).await.unwrap();

    assert_eq!(ops.store().writes(), vec!["delete_event", "create_events"]);

    let events = ops.events();
    assert!(ops.find(&EventId::from("3")).is_none());

    let split: Vec<_> = events.iter().filter(|e| e.seed.title == "Split off").collect();
    assert_eq!(split.len(), 2);
    let new_series = split[0].series_id().cloned().unwrap();
    assert_ne!(new_series, SeriesId::from("repeat-456"));
    assert!(split.iter().all(|e| e.belongs_to(&new_series)));
    assert_eq!(
        events
            .iter()
            .filter(|e| e.belongs_to(&SeriesId::from("repeat-456")))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_editing_missing_event_is_not_found() {
    let mut ops = loaded(RecordingStore::with_events(fixture())).await;

    let ghost = Occurrence::new(EventId::from("999"), single("Ghost", 12));
    let err = ops.save(EventData::Existing(ghost), false).await.unwrap_err();

    assert!(matches!(err, CalError::NotFound(_)));
}

#[tokio::test]
async fn test_whole_series_edit_of_unknown_series_is_not_found() {
    let mut ops = loaded(RecordingStore::default()).await;

    let err = ops
        .save(EventData::Existing(member("1", 8)), true)
        .await
        .unwrap_err();

    assert!(matches!(err, CalError::NotFound(_)));
    assert!(ops.store().writes().is_empty());
}

#[tokio::test]
async fn test_delete_failure_keeps_cache() {
    let store = RecordingStore::with_events(fixture()).fail("delete_event");
    let mut ops = loaded(store).await;
    let before = ops.events().to_vec();

    let err = ops.delete(&EventId::from("single-1")).await.unwrap_err();

    assert!(matches!(err, CalError::DeleteFailed(_)));
    assert_eq!(ops.events(), before.as_slice());
}

#[tokio::test]
async fn test_delete_series_removes_every_member() {
    let mut ops = loaded(RecordingStore::with_events(fixture())).await;

    ops.delete_series(&SeriesId::from("repeat-456"))
        .await
        .unwrap();

    assert_eq!(ops.events().len(), 1);
    assert_eq!(ops.events()[0].id, EventId::from("single-1"));
}

#[tokio::test]
async fn test_refresh_failure_keeps_previous_events() {
    let mut ops = loaded(RecordingStore::with_events(fixture())).await;
    ops.store().failing.lock().unwrap().insert("list_events");

    let err = ops.refresh().await.unwrap_err();

    assert!(matches!(err, CalError::FetchFailed(_)));
    assert_eq!(ops.events().len(), 4);
}

#[tokio::test]
async fn test_reconcile_plan_through_default_path_skips_empty_halves() {
    let store = RecordingStore::with_events(fixture());
    let plan = SeriesPlan {
        series_id: SeriesId::from("repeat-456"),
        to_update: Vec::new(),
        to_delete: vec![EventId::from("3")],
    };

    store.reconcile_series(plan).await.unwrap();

    assert_eq!(store.writes(), vec!["delete_events"]);
}
