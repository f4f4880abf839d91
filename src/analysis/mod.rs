//! Time-series diagnostics
//!
//! # Components
//!
//! - **AugmentedDickeyFuller** - unit-root test used as the stationarity proxy
//! - **StationarityClassifier** - raw, differenced and log stages over one series
//! - **BatchDiagnosticsRunner** - classifies every stored entity and aggregates results
//! - **LengthSummary** - distribution of stored series lengths

pub mod adf;
pub mod correlation;
pub mod diagnostics;
pub mod ols;
pub mod sink;
pub mod stationarity;
pub mod summary;
pub mod transforms;

pub use adf::{AdfResult, AugmentedDickeyFuller, UnitRootTest};
pub use diagnostics::{BatchDiagnosticsRunner, BatchReport};
pub use stationarity::{StationarityClassifier, StationarityVerdict, Transform};
pub use summary::LengthSummary;
