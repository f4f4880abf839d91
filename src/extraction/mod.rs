//! Record extraction
//!
//! Reshapes one entity's loosely-typed query rows into [`EntityAttributes`]
//! and a month-indexed [`EntityTimeSeriesTable`].
//!
//! The pipeline per entity is:
//!
//! 1. decode every row once into a [`Fact`](crate::parsing::Fact)
//! 2. fold attribute facts into the attributes, last write wins
//! 3. fold revision and size facts into per-node aggregates
//! 4. check every node id against the blank-node convention
//! 5. sum node aggregates per month
//!
//! [`EntityAttributes`]: crate::core::EntityAttributes
//! [`EntityTimeSeriesTable`]: crate::core::EntityTimeSeriesTable

use thiserror::Error;

pub mod record_extractor;

pub use record_extractor::{Extraction, ExtractionReport, RecordExtractor};

/// Fatal for the entity being extracted, never for the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("node id {node_id:?} does not follow the blank-node naming convention")]
    DataIntegrity { node_id: String },
    #[error("revision fact without a node id")]
    MissingNodeId,
    #[error("revision count of bucket {bucket} overflows")]
    RevisionOverflow { bucket: String },
}
