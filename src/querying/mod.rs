//! Sources of raw query rows: a remote SPARQL endpoint over HTTP, or a local
//! oxigraph store loaded from an RDF dump. Both produce the same
//! [`QueryRecord`](crate::core::QueryRecord)s.

use thiserror::Error;

pub mod oxigraph_adapter;
pub mod sparql_client;

pub use oxigraph_adapter::{OxigraphAdapter, OxigraphError};
pub use sparql_client::SparqlClient;

/// Wikipedia article namespace the history graph is keyed by.
pub const ARTICLE_BASE: &str = "http://fr.wikipedia.org/wiki/";

pub const ALL_PERSONS_QUERY: &str = r"
    PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
    PREFIX dbpedia-owl: <http://dbpedia.org/ontology/>

    SELECT DISTINCT * WHERE {
        ?person a dbpedia-owl:Person
    }
    ";

/// Every predicate/value pair of the article, plus one hop through blank nodes.
pub fn history_query(person: &str) -> String {
    format!(
        "SELECT DISTINCT * WHERE {{<{}{}> ?p ?v . OPTIONAL {{?v ?p2 ?v2}} }} ORDER BY ?v",
        ARTICLE_BASE, person
    )
}

/// Entity name as used in article IRIs: the last path segment.
pub fn person_name(iri: &str) -> &str {
    iri.rsplit('/').next().unwrap_or(iri)
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },
    #[error("cannot decode results: {0}")]
    Decode(#[from] serde_json::Error),
}
