//! SPARQL 1.1 Query Results JSON decoding.
//!
//! Virtuoso endpoints report typed literals as `"typed-literal"` and blank
//! nodes as `"bnode"` with `nodeID://` values; both are accepted.

use serde::Deserialize;

use crate::core::QueryRecord;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsBody {
    #[serde(default)]
    pub bindings: Vec<QueryRecord>,
}

/// A decoded SELECT result document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: ResultsHead,
    #[serde(default)]
    pub results: ResultsBody,
}

impl SparqlResults {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn into_records(self) -> Vec<QueryRecord> {
        self.results.bindings
    }

    /// Values bound to `var` across all rows, in row order.
    pub fn column<'a>(&'a self, var: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.results.bindings.iter().filter_map(move |r| r.value_of(var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TermKind;

    #[test]
    fn test_decode_virtuoso_document() {
        let doc = r#"{
            "head": {"link": [], "vars": ["p", "v", "p2", "v2"]},
            "results": {"distinct": false, "ordered": true, "bindings": [
                {"p": {"type": "uri", "value": "http://dbpedia.org/property/revPerMonth"},
                 "v": {"type": "bnode", "value": "nodeID://b10001"},
                 "p2": {"type": "uri", "value": "http://dbpedia.org/property/nb"},
                 "v2": {"type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#integer", "value": "42"}},
                {"p": {"type": "uri", "value": "http://www.w3.org/2000/01/rdf-schema#label"},
                 "v": {"type": "literal", "xml:lang": "fr", "value": "Hillary Clinton"}}
            ]}
        }"#;
        let results = SparqlResults::from_json(doc).unwrap();
        assert_eq!(results.head.vars, vec!["p", "v", "p2", "v2"]);
        assert_eq!(results.column("v2").collect::<Vec<_>>(), vec!["42"]);

        let records = results.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("v").unwrap().kind, TermKind::BlankNode);
        assert_eq!(records[0].get("v2").unwrap().kind, TermKind::Literal);
        assert_eq!(records[1].get("v").unwrap().lang.as_deref(), Some("fr"));
        assert!(records[1].get("p2").is_none());
    }

    #[test]
    fn test_empty_document() {
        let results = SparqlResults::from_json("{}").unwrap();
        assert!(results.into_records().is_empty());
    }
}
