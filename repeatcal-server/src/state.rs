use std::path::Path;

use anyhow::{Context, Result};
use repeatcal_core::Occurrence;
use repeatcal_core::protocol::EventBatch;
use repeatcal_core::store::MemoryStore;

/// Shared application state
#[derive(Clone, Default)]
pub struct AppState {
    pub store: MemoryStore,
}

impl AppState {
    pub fn new(store: MemoryStore) -> Self {
        AppState { store }
    }

    /// Start from the events in a `{ "events": [...] }` file.
    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read seed file {}", path.display()))?;
        let batch: EventBatch<Occurrence> = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid seed file {}", path.display()))?;

        tracing::info!(count = batch.events.len(), path = %path.display(), "seeded event store");
        Ok(AppState::new(MemoryStore::with_events(batch.events)))
    }
}
