use chrono::{DateTime, Utc};
use hassmirror_api::EntityState;
use serde::Serialize;

/// The full entity list from the most recent successful fetch.
///
/// Snapshots are immutable once built. The coordinator publishes each one
/// behind an `Arc` and replaces it wholesale, so a reader holding a
/// snapshot never observes a half-applied refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    entities: Vec<EntityState>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Wrap a freshly fetched entity list, stamped with the current time.
    pub fn new(entities: Vec<EntityState>) -> Self {
        Self {
            entities,
            fetched_at: Some(Utc::now()),
        }
    }

    /// The placeholder published before the first fetch completes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[EntityState] {
        &self.entities
    }

    /// When this snapshot was fetched. `None` for the initial placeholder.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Look up a record by entity id. Linear scan; snapshots are small.
    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityState> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
