//! # webts
//!
//! webts turns the revision history of Wikipedia articles, as published in a
//! SPARQL-queryable history graph, into monthly time series and classifies
//! each series as stationary or not.
//!
//! ## Features
//!
//! - Decoding of loosely-typed SPARQL rows into typed facts
//! - Per-entity monthly tables of revision counts and average sizes
//! - Augmented Dickey-Fuller based stationarity classification with
//!   differencing and log fallbacks
//! - Batch diagnostics over a repository of stored entities
//!
//! ## Example
//!
//! ```rust
//! use webts::analysis::{StationarityClassifier, Transform};
//! use webts::config::StationarityConfig;
//!
//! fn example() -> webts::Result<()> {
//!     let classifier = StationarityClassifier::new(StationarityConfig::default());
//!     let verdict = classifier.classify(&[4.0; 12])?;
//!     assert_eq!(verdict.transform_applied, Transform::None);
//!     assert!(verdict.is_stationary);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::new_without_default)]

/// Core data structures and types
pub mod core;

/// Configuration structures and utilities
pub mod config;

/// Decoding of query rows and literals
pub mod parsing;

/// Per-entity reshaping of query rows into tables
pub mod extraction;

pub mod storage;

/// Stationarity testing and batch diagnostics
pub mod analysis;

/// Remote and local SPARQL evaluation
pub mod querying;

pub mod acquisition;

pub mod error;

// Re-export commonly used types
pub use error::{Error, Result};
