//! Entity record persistence.
//!
//! The pipeline only needs three operations from a store: put a record and get
//! an opaque id back, list ids, and load a record by id. Implementations must
//! return tables with the same row order and bit-identical numeric values.

use std::collections::BTreeSet;
use thiserror::Error;

use crate::core::{EntityId, EntityRecord};

pub mod file_repository;
pub mod memory_repository;

pub use file_repository::FileRepository;
pub use memory_repository::MemoryRepository;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The backing store cannot be reached at all.
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("no record with id {0}")]
    NotFound(EntityId),
    #[error("corrupt record {id}: {message}")]
    Codec { id: EntityId, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait SeriesRepository {
    fn store(&mut self, record: EntityRecord) -> Result<EntityId, RepositoryError>;

    fn list_ids(&self) -> Result<BTreeSet<EntityId>, RepositoryError>;

    fn load(&self, id: &EntityId) -> Result<EntityRecord, RepositoryError>;
}
