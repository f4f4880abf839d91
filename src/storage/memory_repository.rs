use std::collections::{BTreeMap, BTreeSet};

use crate::core::{EntityId, EntityRecord};
use crate::storage::{RepositoryError, SeriesRepository};

/// Process-local repository, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: BTreeMap<EntityId, EntityRecord>,
    next_id: u64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SeriesRepository for MemoryRepository {
    fn store(&mut self, record: EntityRecord) -> Result<EntityId, RepositoryError> {
        let id = EntityId(format!("entity-{:06}", self.next_id));
        self.next_id += 1;
        self.records.insert(id.clone(), record);
        Ok(id)
    }

    fn list_ids(&self) -> Result<BTreeSet<EntityId>, RepositoryError> {
        Ok(self.records.keys().cloned().collect())
    }

    fn load(&self, id: &EntityId) -> Result<EntityRecord, RepositoryError> {
        self.records.get(id).cloned().ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }
}
