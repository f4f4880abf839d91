//! Oxigraph-based local evaluation of the history query.
//!
//! Loads an RDF dump into an in-memory store and answers the same SELECT
//! queries the remote endpoint would, returning [`QueryRecord`]s. Blank nodes
//! are reported as `nodeID://<label>`, the form Virtuoso endpoints use.
//!
//! # Example
//!
//! ```ignore
//! use oxigraph::io::RdfFormat;
//! use webts::querying::OxigraphAdapter;
//!
//! let adapter = OxigraphAdapter::new()?;
//! adapter.load(std::fs::File::open("history.nt")?, RdfFormat::NTriples)?;
//! let records = adapter.history_for("Hillary_Clinton")?;
//! ```

use log::debug;
use oxigraph::io::RdfFormat;
use oxigraph::model::Term as OxTerm;
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;
use std::fmt;
use std::io::Read;

use crate::core::{QueryRecord, Term, TermKind};
use crate::querying::history_query;

#[derive(Debug)]
pub struct OxigraphError(String);

impl fmt::Display for OxigraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oxigraph error: {}", self.0)
    }
}

impl std::error::Error for OxigraphError {}

impl From<oxigraph::store::StorageError> for OxigraphError {
    fn from(err: oxigraph::store::StorageError) -> Self {
        OxigraphError(err.to_string())
    }
}

impl From<oxigraph::store::LoaderError> for OxigraphError {
    fn from(err: oxigraph::store::LoaderError) -> Self {
        OxigraphError(err.to_string())
    }
}

impl From<oxigraph::sparql::QueryEvaluationError> for OxigraphError {
    fn from(err: oxigraph::sparql::QueryEvaluationError) -> Self {
        OxigraphError(err.to_string())
    }
}

pub struct OxigraphAdapter {
    store: Store,
}

impl OxigraphAdapter {
    pub fn new() -> Result<Self, OxigraphError> {
        Ok(Self { store: Store::new()? })
    }

    pub fn load<R: Read>(&self, reader: R, format: RdfFormat) -> Result<(), OxigraphError> {
        self.store.load_from_reader(format, reader)?;
        debug!("loaded dump, store now holds {} quads", self.store.len()?);
        Ok(())
    }

    /// Evaluates a SELECT query. Other query forms yield no rows.
    pub fn select(&self, query: &str) -> Result<Vec<QueryRecord>, OxigraphError> {
        let evaluator = SparqlEvaluator::new();
        let parsed_query =
            evaluator.parse_query(query).map_err(|e| OxigraphError(e.to_string()))?;
        let results = parsed_query.on_store(&self.store).execute()?;

        let mut records = Vec::new();
        if let QueryResults::Solutions(solutions) = results {
            for solution in solutions {
                let solution = solution?;
                let mut record = QueryRecord::new();
                for (var, term) in solution.iter() {
                    record.bindings.insert(var.as_str().to_string(), convert_term(term));
                }
                records.push(record);
            }
        }
        Ok(records)
    }

    pub fn history_for(&self, person: &str) -> Result<Vec<QueryRecord>, OxigraphError> {
        self.select(&history_query(person))
    }
}

fn convert_term(term: &OxTerm) -> Term {
    match term {
        OxTerm::NamedNode(node) => Term::uri(node.as_str()),
        OxTerm::BlankNode(node) => Term::blank_node(&format!("nodeID://{}", node.as_str())),
        OxTerm::Literal(literal) => Term {
            kind: TermKind::Literal,
            value: literal.value().to_string(),
            datatype: Some(literal.datatype().as_str().to_string()),
            lang: literal.language().map(str::to_string),
        },
        #[allow(unreachable_patterns)]
        other => Term::literal(&other.to_string()),
    }
}
