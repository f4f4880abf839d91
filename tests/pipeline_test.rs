use oxigraph::io::RdfFormat;
use webts::acquisition::{AcquisitionPipeline, IngestOutcome};
use webts::analysis::{BatchDiagnosticsRunner, StationarityClassifier};
use webts::config::PipelineConfig;
use webts::core::{Column, TermKind};
use webts::parsing::SparqlResults;
use webts::querying::{OxigraphAdapter, ALL_PERSONS_QUERY};
use webts::storage::{FileRepository, SeriesRepository};

const PROP: &str = "http://dbpedia.org/property/";
const WIKI: &str = "http://fr.wikipedia.org/wiki/";

/// History graph of one article: one revision node and one size node per month.
fn dump(person: &str, months: usize, contributors: u32) -> String {
    let subject = format!("<{}{}>", WIKI, person);
    let mut out = format!(
        "{} <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://dbpedia.org/ontology/Person> .\n",
        subject
    );
    out.push_str(&format!(
        "{} <{}uniqueContributorNb> \"{}\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n",
        subject, PROP, contributors
    ));
    for i in 0..months {
        let month = format!("{:02}/{}", i % 12 + 1, 2010 + i / 12);
        let revisions = 20 + (i * 7) % 11;
        out.push_str(&format!("{} <{}revPerMonth> _:{}r{} .\n", subject, PROP, person, i));
        out.push_str(&format!("_:{}r{} <{}nb> \"{}\" .\n", person, i, PROP, revisions));
        out.push_str(&format!("_:{}r{} <{}month> \"{}\" .\n", person, i, PROP, month));
        out.push_str(&format!("{} <{}averageSizePerMonth> _:{}s{} .\n", subject, PROP, person, i));
        out.push_str(&format!("_:{}s{} <{}size> \"{}.5\" .\n", person, i, PROP, 3000 + i * 10));
        out.push_str(&format!("_:{}s{} <{}month> \"{}\" .\n", person, i, PROP, month));
    }
    out
}

#[test]
fn test_dump_to_report() {
    let adapter = OxigraphAdapter::new().unwrap();
    let mut nt = dump("Simone_Veil", 18, 9);
    nt.push_str(&dump("Jean_Moulin", 5, 2));
    adapter.load(nt.as_bytes(), RdfFormat::NTriples).unwrap();

    let people = adapter.select(ALL_PERSONS_QUERY).unwrap();
    assert_eq!(people.len(), 2);

    let config = PipelineConfig::default();
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileRepository::open(dir.path()).unwrap();
    let pipeline = AcquisitionPipeline::new(&config.extraction, &config.acquisition).unwrap();

    let history = adapter.history_for("Simone_Veil").unwrap();
    assert!(history
        .iter()
        .filter(|r| r.get("v").map(|t| t.kind) == Some(TermKind::BlankNode))
        .all(|r| r.value_of("v").unwrap_or_default().starts_with("nodeID://")));
    let stored = match pipeline.ingest(&mut repo, "Simone_Veil", &history).unwrap() {
        IngestOutcome::Stored(id) => id,
        other => panic!("expected a stored record, got {:?}", other),
    };

    let short = adapter.history_for("Jean_Moulin").unwrap();
    assert_eq!(
        pipeline.ingest(&mut repo, "Jean_Moulin", &short).unwrap(),
        IngestOutcome::Insufficient { rows: 5 }
    );
    let unknown = adapter.history_for("Personne").unwrap();
    assert_eq!(pipeline.ingest(&mut repo, "Personne", &unknown).unwrap(), IngestOutcome::Empty);

    let record = repo.load(&stored).unwrap();
    assert_eq!(record.table.len(), 18);
    assert_eq!(record.attributes.unique_contributors, Some(9));
    assert_eq!(record.table.column(Column::SizeRev)[0], 3000.5);

    let runner = BatchDiagnosticsRunner::new(StationarityClassifier::new(config.stationarity));
    let report = runner.run(&repo).unwrap();
    assert_eq!(report.entities_visited, 1);
    assert_eq!(report.verdicts.len(), 2);
    let total: i64 = record.table.total_revisions().unwrap();
    assert_eq!(report.ratios[&stored], total as f64 / 9.0);
    assert_eq!(report.last_update_line(), "Last update: 2011-06");
}

#[test]
fn test_saved_results_file_ingests() {
    let doc = r#"{
        "head": {"link": [], "vars": ["p", "v", "p2", "v2"]},
        "results": {"distinct": false, "ordered": true, "bindings": [
            {"p": {"type": "uri", "value": "http://dbpedia.org/property/revPerMonth"},
             "v": {"type": "bnode", "value": "nodeID://b10001"},
             "p2": {"type": "uri", "value": "http://dbpedia.org/property/nb"},
             "v2": {"type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#integer", "value": "31"}},
            {"p": {"type": "uri", "value": "http://dbpedia.org/property/revPerMonth"},
             "v": {"type": "bnode", "value": "nodeID://b10001"},
             "p2": {"type": "uri", "value": "http://dbpedia.org/property/month"},
             "v2": {"type": "literal", "value": "11/2004"}},
            {"p": {"type": "uri", "value": "http://dbpedia.org/ontology/wikiPageWikiLink"},
             "v": {"type": "uri", "value": "http://fr.dbpedia.org/resource/Paris"},
             "p2": {"type": "uri", "value": "http://dbpedia.org/ontology/birthDate"},
             "v2": {"type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#date", "value": "1802-02-26+02:00"}}
        ]}
    }"#;
    let results = SparqlResults::from_json(doc).unwrap();
    assert_eq!(results.head.vars, vec!["p", "v", "p2", "v2"]);
    let records = results.into_records();
    assert_eq!(records.len(), 3);

    let mut config = PipelineConfig::default();
    config.acquisition.min_table_rows = 1;
    let pipeline = AcquisitionPipeline::new(&config.extraction, &config.acquisition).unwrap();
    let mut repo = webts::storage::MemoryRepository::new();
    let IngestOutcome::Stored(id) = pipeline.ingest(&mut repo, "Victor_Hugo", &records).unwrap()
    else {
        panic!("expected a stored record");
    };
    let record = repo.load(&id).unwrap();
    assert_eq!(record.table.column(Column::NumRev), vec![31.0]);
    assert_eq!(record.attributes.birth_date.map(|d| d.to_string()), Some("1802-02-26".to_string()));
}
