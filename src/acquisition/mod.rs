//! Acquisition
//!
//! Feeds raw query rows through extraction and stores the tables that are
//! long enough to analyse. Each entity ends in exactly one [`IngestOutcome`].

pub mod pipeline;

pub use pipeline::{AcquisitionPipeline, AcquisitionSummary, IngestOutcome};
