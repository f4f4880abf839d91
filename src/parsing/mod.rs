//! Decoding of query output: SPARQL JSON documents, fact classification and
//! literal parsing.

pub mod fact_decoder;
pub mod sparql_results;
pub mod value_parser;

pub use fact_decoder::{Fact, FactDecoder};
pub use sparql_results::SparqlResults;
pub use value_parser::{ParseAttempt, ValueParser};
