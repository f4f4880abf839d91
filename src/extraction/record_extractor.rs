use log::{debug, warn};
use std::collections::BTreeMap;

use crate::config::{ConfigError, ExtractionConfig};
use crate::core::{
    BucketKey, EntityAttributes, EntityTimeSeriesTable, NodeAggregate, QueryRecord, TimeBucket,
    Value,
};
use crate::extraction::ExtractionError;
use crate::parsing::value_parser::{AVERAGE_SIZE, FULL_DATE, INTEGER, REVISION_COUNT};
use crate::parsing::{Fact, FactDecoder, ValueParser};

/// A literal that matched none of its parse attempts. Extraction keeps going.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedLiteral {
    pub field: &'static str,
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    pub records: usize,
    pub unrecognized: usize,
    pub nodes: usize,
    pub degraded: Vec<DegradedLiteral>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// No revision or size fact: nothing worth storing.
    Empty,
    Populated {
        attributes: EntityAttributes,
        table: EntityTimeSeriesTable,
        report: ExtractionReport,
    },
}

/// Turns one entity's query rows into its attributes and monthly table.
pub struct RecordExtractor {
    decoder: FactDecoder,
    parser: ValueParser,
}

impl RecordExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            decoder: FactDecoder::new(config)?,
            parser: ValueParser::new(config.date_formats.clone()),
        })
    }

    pub fn extract(&self, records: &[QueryRecord]) -> Result<Extraction, ExtractionError> {
        let mut report = ExtractionReport { records: records.len(), ..Default::default() };
        let mut attributes = EntityAttributes::default();
        let mut nodes: BTreeMap<String, NodeAggregate> = BTreeMap::new();

        for record in records {
            match self.decoder.decode(record) {
                Fact::RevisionCount { node, companion } => {
                    let aggregate = nodes.entry(node.ok_or(ExtractionError::MissingNodeId)?).or_default();
                    match companion.as_deref().map(|raw| self.parser.parse(raw, REVISION_COUNT)) {
                        Some(Value::Number(n)) => aggregate.revision_count = n as i64,
                        Some(Value::Date(month)) => aggregate.month = Some(month),
                        Some(Value::Raw(raw)) => degrade(&mut report, "revision_count", Some(raw)),
                        None => degrade(&mut report, "revision_count", None),
                    }
                }
                Fact::Size { node, companion } => {
                    let aggregate = nodes.entry(node.ok_or(ExtractionError::MissingNodeId)?).or_default();
                    match companion.as_deref().map(|raw| self.parser.parse(raw, AVERAGE_SIZE)) {
                        Some(Value::Number(n)) => aggregate.size_revision = n,
                        Some(Value::Date(month)) => aggregate.month = Some(month),
                        Some(Value::Raw(raw)) => degrade(&mut report, "size_revision", Some(raw)),
                        None => degrade(&mut report, "size_revision", None),
                    }
                }
                Fact::BirthDate(raw) => {
                    attributes.birth_date = Some(self.date_attribute(&mut report, "birth_date", &raw));
                }
                Fact::DeathDate(raw) => {
                    attributes.death_date = Some(self.date_attribute(&mut report, "death_date", &raw));
                }
                Fact::OfficeTenure(raw) => {
                    let date = self.date_attribute(&mut report, "important_dates", &raw);
                    attributes.important_dates.push(date);
                }
                Fact::ContributorCount(raw) => match self.parser.parse(&raw, INTEGER) {
                    Value::Number(n) => attributes.unique_contributors = Some(n as i64),
                    _ => degrade(&mut report, "unique_contributors", Some(raw)),
                },
                Fact::Unrecognized => report.unrecognized += 1,
            }
        }

        if nodes.is_empty() {
            debug!("no revision facts among {} records", records.len());
            return Ok(Extraction::Empty);
        }

        if let Some(bad) = nodes.keys().find(|id| !self.decoder.is_node_id(id)) {
            return Err(ExtractionError::DataIntegrity { node_id: bad.clone() });
        }

        report.nodes = nodes.len();
        let table = EntityTimeSeriesTable::from_buckets(bucket_by_month(nodes.values())?);
        Ok(Extraction::Populated { attributes, table, report })
    }

    fn date_attribute(&self, report: &mut ExtractionReport, field: &'static str, raw: &str) -> Value {
        let value = self.parser.parse(raw, FULL_DATE);
        if value.is_raw() {
            degrade(report, field, Some(raw.to_string()));
        }
        value
    }
}

fn degrade(report: &mut ExtractionReport, field: &'static str, raw: Option<String>) {
    warn!("unparseable {} literal {:?}, keeping best-effort value", field, raw);
    report.degraded.push(DegradedLiteral { field, raw });
}

/// Sums nodes per month. Nodes without a month all land in `BucketKey::Unset`.
pub fn bucket_by_month<'a>(
    nodes: impl IntoIterator<Item = &'a NodeAggregate>,
) -> Result<BTreeMap<BucketKey, TimeBucket>, ExtractionError> {
    let mut buckets: BTreeMap<BucketKey, TimeBucket> = BTreeMap::new();
    for node in nodes {
        let key = BucketKey::from(node.month);
        if buckets.entry(key).or_default().add(node).is_none() {
            return Err(ExtractionError::RevisionOverflow { bucket: key.to_string() });
        }
    }
    Ok(buckets)
}
