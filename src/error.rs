//! Error types and result definitions

use thiserror::Error;

use crate::analysis::diagnostics::DiagnosticsError;
use crate::analysis::stationarity::StationarityError;
use crate::config::ConfigError;
use crate::extraction::ExtractionError;
use crate::querying::{ClientError, OxigraphError};
use crate::storage::RepositoryError;

/// Result type alias for webts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for webts
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Extraction error for a single entity
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Stationarity classification error
    #[error("Stationarity error: {0}")]
    Stationarity(#[from] StationarityError),

    /// Diagnostics aggregation error
    #[error("Diagnostics error: {0}")]
    Diagnostics(#[from] DiagnosticsError),

    /// SPARQL client error
    #[error("Query error: {0}")]
    Query(#[from] ClientError),

    /// Local store error
    #[error("Local store error: {0}")]
    Local(#[from] OxigraphError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
