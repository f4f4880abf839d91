use log::{debug, info, warn};
use std::collections::BTreeMap;

use crate::config::{AcquisitionConfig, ConfigError, ExtractionConfig};
use crate::core::{EntityId, EntityRecord, QueryRecord};
use crate::extraction::{Extraction, ExtractionError, RecordExtractor};
use crate::querying::{ClientError, SparqlClient};
use crate::storage::{RepositoryError, SeriesRepository};

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Stored(EntityId),
    /// No revision facts at all.
    Empty,
    /// A table was built but is shorter than the configured minimum.
    Insufficient { rows: usize },
    Rejected(ExtractionError),
    /// The history query for this entity failed or was refused.
    Unavailable,
}

/// Counts per outcome over one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquisitionSummary {
    pub stored: BTreeMap<String, EntityId>,
    pub empty: usize,
    pub insufficient: usize,
    pub rejected: usize,
    pub unavailable: usize,
}

impl AcquisitionSummary {
    pub fn record(&mut self, name: &str, outcome: &IngestOutcome) {
        match outcome {
            IngestOutcome::Stored(id) => {
                self.stored.insert(name.to_string(), id.clone());
            }
            IngestOutcome::Empty => self.empty += 1,
            IngestOutcome::Insufficient { .. } => self.insufficient += 1,
            IngestOutcome::Rejected(_) => self.rejected += 1,
            IngestOutcome::Unavailable => self.unavailable += 1,
        }
    }

    pub fn visited(&self) -> usize {
        self.stored.len() + self.empty + self.insufficient + self.rejected + self.unavailable
    }
}

pub struct AcquisitionPipeline {
    extractor: RecordExtractor,
    min_table_rows: usize,
}

impl AcquisitionPipeline {
    pub fn new(extraction: &ExtractionConfig, acquisition: &AcquisitionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            extractor: RecordExtractor::new(extraction)?,
            min_table_rows: acquisition.min_table_rows,
        })
    }

    /// Extracts one entity and stores it when its table is long enough.
    /// Extraction problems are outcomes; only the repository can fail the call.
    pub fn ingest(
        &self,
        repository: &mut dyn SeriesRepository,
        name: &str,
        records: &[QueryRecord],
    ) -> Result<IngestOutcome, RepositoryError> {
        let (attributes, table, report) = match self.extractor.extract(records) {
            Ok(Extraction::Empty) => {
                debug!("{}: no revision history", name);
                return Ok(IngestOutcome::Empty);
            }
            Ok(Extraction::Populated { attributes, table, report }) => (attributes, table, report),
            Err(e) => {
                warn!("{}: {}", name, e);
                return Ok(IngestOutcome::Rejected(e));
            }
        };

        if table.len() < self.min_table_rows {
            debug!("{}: {} rows, below minimum of {}", name, table.len(), self.min_table_rows);
            return Ok(IngestOutcome::Insufficient { rows: table.len() });
        }

        let rows = table.len();
        let id = repository.store(EntityRecord { name: name.to_string(), attributes, table })?;
        info!(
            "{}: stored as {} ({} rows, {} nodes, {} degraded literals)",
            name,
            id,
            rows,
            report.nodes,
            report.degraded.len()
        );
        Ok(IngestOutcome::Stored(id))
    }

    /// Turns one person's history response into an outcome. Any client error
    /// here concerns only this person and is counted as unavailable.
    pub fn settle(
        &self,
        repository: &mut dyn SeriesRepository,
        person: &str,
        response: Result<Option<Vec<QueryRecord>>, ClientError>,
    ) -> Result<IngestOutcome, RepositoryError> {
        match response {
            Ok(Some(records)) => self.ingest(repository, person, &records),
            Ok(None) => Ok(IngestOutcome::Unavailable),
            Err(e) => {
                warn!("{}: history query failed, skipping ({})", person, e);
                Ok(IngestOutcome::Unavailable)
            }
        }
    }

    /// Walks the endpoint's person list from `start_offset`, at most `limit`
    /// people, ingesting each history. A person whose history query fails for
    /// any reason is skipped. Failing to list people, or to store a record,
    /// stops the batch.
    pub async fn acquire_all(
        &self,
        client: &SparqlClient,
        repository: &mut dyn SeriesRepository,
        config: &AcquisitionConfig,
    ) -> crate::Result<AcquisitionSummary> {
        let people = client.all_people().await?;
        info!("{} people listed by {}", people.len(), client.endpoint());

        let selected = people
            .iter()
            .skip(config.start_offset)
            .take(config.limit.unwrap_or(usize::MAX));

        let mut summary = AcquisitionSummary::default();
        for (position, person) in selected.enumerate() {
            let response = client.history_for(person).await;
            let outcome = self.settle(repository, person, response)?;
            debug!("#{} {}: {:?}", config.start_offset + position, person, outcome);
            summary.record(person, &outcome);
        }

        info!(
            "acquisition done: {} stored, {} empty, {} insufficient, {} rejected, {} unavailable",
            summary.stored.len(),
            summary.empty,
            summary.insufficient,
            summary.rejected,
            summary.unavailable
        );
        Ok(summary)
    }
}
