//! webts command-line interface.
//!
//! Usage:
//!   webts acquire --offset 0 --limit 500
//!   webts ingest-file --name Victor_Hugo data/victor_hugo.json
//!   webts ingest-rdf data/history.nt --person Victor_Hugo
//!   webts analyze --ratios ratios.csv --diagnostics diagnostics.jsonl
//!   webts lengths

use clap::{Parser, Subcommand};
use log::{info, warn};
use oxigraph::io::RdfFormat;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use webts::acquisition::{AcquisitionPipeline, AcquisitionSummary};
use webts::analysis::sink::JsonLinesSink;
use webts::analysis::{BatchDiagnosticsRunner, LengthSummary, StationarityClassifier};
use webts::config::{ConfigError, PipelineConfig};
use webts::parsing::SparqlResults;
use webts::querying::{person_name, ClientError, OxigraphAdapter, SparqlClient, ALL_PERSONS_QUERY};
use webts::storage::{FileRepository, SeriesRepository};

#[derive(Parser, Debug)]
#[command(name = "webts")]
#[command(about = "Monthly revision time series of Wikipedia articles and their stationarity")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Record directory, overrides `storage_path` from the configuration
    #[arg(short, long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the remote endpoint for every person and store their tables
    Acquire {
        /// Position in the person list to start from
        #[arg(long)]
        offset: Option<usize>,

        /// Maximum number of people to query
        #[arg(long)]
        limit: Option<usize>,

        /// SPARQL endpoint URL
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Ingest one entity from a saved SPARQL JSON results file
    IngestFile {
        /// Results of the history query for this entity
        input: PathBuf,

        /// Entity name
        #[arg(short, long)]
        name: String,
    },
    /// Load an RDF dump locally and ingest people from it
    IngestRdf {
        /// N-Triples, N-Quads or Turtle file
        input: PathBuf,

        /// People to ingest; every person typed in the dump when omitted
        #[arg(short, long)]
        person: Vec<String>,
    },
    /// Classify every stored series and write the ratio report
    Analyze {
        /// Output of `<entity_id>,<ratio>` lines
        #[arg(long, default_value = "ratios.csv")]
        ratios: PathBuf,

        /// Write rolling statistics and correlograms as JSON lines
        #[arg(long)]
        diagnostics: Option<PathBuf>,
    },
    /// Summarise the lengths of stored series
    Lengths,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(storage) = &cli.storage {
        config.storage_path = storage.display().to_string();
    }
    Ok(config)
}

fn rdf_format(path: &Path) -> Result<RdfFormat, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("nt") => Ok(RdfFormat::NTriples),
        Some("nq") => Ok(RdfFormat::NQuads),
        Some("ttl") => Ok(RdfFormat::Turtle),
        other => Err(ConfigError::Invalid(format!("unsupported RDF file extension: {:?}", other))),
    }
}

fn print_summary(summary: &AcquisitionSummary) {
    println!("Visited: {}", summary.visited());
    println!("Stored: {}", summary.stored.len());
    println!("Empty: {}", summary.empty);
    println!("Too short: {}", summary.insufficient);
    println!("Rejected: {}", summary.rejected);
    println!("Unavailable: {}", summary.unavailable);
}

async fn acquire(
    config: &mut PipelineConfig,
    offset: Option<usize>,
    limit: Option<usize>,
    endpoint: Option<String>,
) -> webts::Result<()> {
    if let Some(offset) = offset {
        config.acquisition.start_offset = offset;
    }
    if limit.is_some() {
        config.acquisition.limit = limit;
    }
    if let Some(endpoint) = endpoint {
        config.acquisition.endpoint = endpoint;
    }

    let mut repository = FileRepository::open(&config.storage_path)?;
    let pipeline = AcquisitionPipeline::new(&config.extraction, &config.acquisition)?;
    let client = SparqlClient::new(&config.acquisition)?;
    let summary = pipeline.acquire_all(&client, &mut repository, &config.acquisition).await?;
    print_summary(&summary);
    Ok(())
}

fn ingest_file(config: &PipelineConfig, input: &Path, name: &str) -> webts::Result<()> {
    let results = SparqlResults::from_reader(BufReader::new(File::open(input)?))
        .map_err(ClientError::from)?;
    let mut repository = FileRepository::open(&config.storage_path)?;
    let pipeline = AcquisitionPipeline::new(&config.extraction, &config.acquisition)?;

    let outcome = pipeline.ingest(&mut repository, name, &results.into_records())?;
    let mut summary = AcquisitionSummary::default();
    summary.record(name, &outcome);
    print_summary(&summary);
    Ok(())
}

fn ingest_rdf(config: &PipelineConfig, input: &Path, people: Vec<String>) -> webts::Result<()> {
    let adapter = OxigraphAdapter::new()?;
    adapter.load(BufReader::new(File::open(input)?), rdf_format(input)?)?;

    let people = if people.is_empty() {
        let listed = adapter.select(ALL_PERSONS_QUERY)?;
        listed
            .iter()
            .filter_map(|r| r.value_of("person"))
            .map(|iri| person_name(iri).to_string())
            .collect()
    } else {
        people
    };
    info!("{} people to ingest from {}", people.len(), input.display());

    let mut repository = FileRepository::open(&config.storage_path)?;
    let pipeline = AcquisitionPipeline::new(&config.extraction, &config.acquisition)?;
    let mut summary = AcquisitionSummary::default();
    for person in &people {
        let records = adapter.history_for(person)?;
        let outcome = pipeline.ingest(&mut repository, person, &records)?;
        summary.record(person, &outcome);
    }
    print_summary(&summary);
    Ok(())
}

fn analyze(config: &PipelineConfig, ratios: &Path, diagnostics: Option<&Path>) -> webts::Result<()> {
    let repository = FileRepository::open(&config.storage_path)?;
    let runner = BatchDiagnosticsRunner::new(StationarityClassifier::new(config.stationarity.clone()));

    let report = match diagnostics {
        Some(path) => {
            let mut sink = JsonLinesSink::new(BufWriter::new(File::create(path)?));
            let report = runner.run_observed(&repository, &mut sink)?;
            sink.finish()?;
            report
        }
        None => runner.run(&repository)?,
    };

    report.write_ratio_report(BufWriter::new(File::create(ratios)?))?;

    for ((id, column), (index, value)) in &report.peaks {
        info!("peak {}/{}: {} at {}", id, column, value, index);
    }
    for (id, error) in &report.ratio_failures {
        warn!("{}: {}", id, error);
    }

    println!("Entities: {}", report.entities_visited);
    println!("Stationary columns: {}", report.stationary_count());
    println!("Failed entities: {}", report.failed.len());
    println!("Too short to test: {}", report.insufficient.len());
    println!("Non-finite: {}", report.non_finite.len());
    println!("Unreadable: {}", report.load_failures.len());
    println!("{}", report.last_update_line());
    Ok(())
}

fn lengths(config: &PipelineConfig) -> webts::Result<()> {
    let repository = FileRepository::open(&config.storage_path)?;
    let mut lengths = Vec::new();
    for id in repository.list_ids()? {
        match repository.load(&id) {
            Ok(record) => lengths.push(record.table.len()),
            Err(e) => warn!("skipping {}: {}", id, e),
        }
    }
    match LengthSummary::from_lengths(&lengths) {
        Some(summary) => println!("{}", summary),
        None => println!("No stored series"),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Command::Acquire { offset, limit, endpoint } => {
            acquire(&mut config, offset, limit, endpoint).await
        }
        Command::IngestFile { input, name } => ingest_file(&config, &input, &name),
        Command::IngestRdf { input, person } => ingest_rdf(&config, &input, person),
        Command::Analyze { ratios, diagnostics } => analyze(&config, &ratios, diagnostics.as_deref()),
        Command::Lengths => lengths(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
