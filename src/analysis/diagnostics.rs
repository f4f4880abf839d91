//! Batch diagnostics over every stored entity.
//!
//! The id list is read once when a run starts. Each entity is loaded, its
//! columns classified, and the per-entity outcome folded into a
//! [`BatchReport`]. The fold only inserts into keyed collections and takes a
//! maximum, so the final report does not depend on visiting order.

use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use thiserror::Error;

use crate::analysis::adf::UnitRootTest;
use crate::analysis::sink::{DiagnosticSink, NullSink};
use crate::analysis::stationarity::{StationarityClassifier, StationarityError, StationarityVerdict};
use crate::core::{BucketKey, Column, EntityId, EntityRecord};
use crate::storage::{RepositoryError, SeriesRepository};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosticsError {
    #[error("revision/contributor ratio undefined for {entity}: {reason}")]
    DivisionUndefined { entity: EntityId, reason: &'static str },
}

/// Total revisions divided by unique contributors.
pub fn revision_contributor_ratio(id: &EntityId, record: &EntityRecord) -> Result<f64, DiagnosticsError> {
    match record.attributes.unique_contributors {
        None => Err(DiagnosticsError::DivisionUndefined {
            entity: id.clone(),
            reason: "contributor count missing",
        }),
        Some(0) => Err(DiagnosticsError::DivisionUndefined {
            entity: id.clone(),
            reason: "contributor count is zero",
        }),
        Some(n) => match record.table.total_revisions() {
            Some(total) => Ok(total as f64 / n as f64),
            None => Err(DiagnosticsError::DivisionUndefined {
                entity: id.clone(),
                reason: "revision total overflows",
            }),
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOutcome {
    pub column: Column,
    pub verdict: Result<StationarityVerdict, StationarityError>,
    pub peak: Option<(BucketKey, f64)>,
}

/// Everything learned about one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDiagnostics {
    pub id: EntityId,
    pub name: String,
    pub columns: Vec<ColumnOutcome>,
    pub ratio: Result<f64, DiagnosticsError>,
    pub last_month: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub verdicts: BTreeMap<(EntityId, Column), StationarityVerdict>,
    /// Entities with at least one column that failed every stage.
    pub failed: BTreeSet<EntityId>,
    /// Columns too short to test; excluded from pass/fail counts.
    pub insufficient: BTreeSet<(EntityId, Column)>,
    /// Columns whose test statistic came out NaN or infinite; also excluded.
    pub non_finite: BTreeSet<(EntityId, Column)>,
    pub peaks: BTreeMap<(EntityId, Column), (BucketKey, f64)>,
    pub ratios: BTreeMap<EntityId, f64>,
    pub ratio_failures: BTreeMap<EntityId, DiagnosticsError>,
    pub load_failures: BTreeMap<EntityId, String>,
    /// Latest month across every table.
    pub last_update: Option<NaiveDate>,
    pub entities_visited: usize,
}

impl BatchReport {
    pub fn absorb(&mut self, entity: EntityDiagnostics) {
        self.entities_visited += 1;
        for outcome in entity.columns {
            let key = (entity.id.clone(), outcome.column);
            if let Some(peak) = outcome.peak {
                self.peaks.insert(key.clone(), peak);
            }
            match outcome.verdict {
                Ok(verdict) => {
                    if !verdict.is_stationary {
                        self.failed.insert(entity.id.clone());
                    }
                    self.verdicts.insert(key, verdict);
                }
                Err(StationarityError::InsufficientData { .. }) => {
                    self.insufficient.insert(key);
                }
                Err(StationarityError::NonFinite) => {
                    self.non_finite.insert(key);
                }
            }
        }
        match entity.ratio {
            Ok(ratio) => {
                self.ratios.insert(entity.id.clone(), ratio);
            }
            Err(e) => {
                self.ratio_failures.insert(entity.id.clone(), e);
            }
        }
        self.last_update = self.last_update.max(entity.last_month);
    }

    pub fn record_load_failure(&mut self, id: EntityId, error: &RepositoryError) {
        self.load_failures.insert(id, error.to_string());
    }

    pub fn stationary_count(&self) -> usize {
        self.verdicts.values().filter(|v| v.is_stationary).count()
    }

    /// `<entity_id>,<ratio>` per line, ordered by id.
    pub fn write_ratio_report<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for (id, ratio) in &self.ratios {
            writeln!(writer, "{},{}", id, ratio)?;
        }
        writer.flush()
    }

    pub fn last_update_line(&self) -> String {
        match self.last_update {
            Some(month) => format!("Last update: {}", month.format("%Y-%m")),
            None => "Last update: none".to_string(),
        }
    }
}

pub struct BatchDiagnosticsRunner<T: UnitRootTest> {
    classifier: StationarityClassifier<T>,
}

impl<T: UnitRootTest> BatchDiagnosticsRunner<T> {
    pub fn new(classifier: StationarityClassifier<T>) -> Self {
        Self { classifier }
    }

    pub fn run(&self, repository: &dyn SeriesRepository) -> Result<BatchReport, RepositoryError> {
        self.run_observed(repository, &mut NullSink)
    }

    /// Only a failure to list ids aborts the run; per-entity load failures are
    /// collected in the report.
    pub fn run_observed(
        &self,
        repository: &dyn SeriesRepository,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<BatchReport, RepositoryError> {
        let ids = repository.list_ids()?;
        info!("running diagnostics over {} entities", ids.len());

        let mut report = BatchReport::default();
        for id in ids {
            match repository.load(&id) {
                Ok(record) => report.absorb(self.diagnose(&id, &record, sink)),
                Err(e) => {
                    warn!("skipping {}: {}", id, e);
                    report.record_load_failure(id, &e);
                }
            }
        }

        info!(
            "{} entities, {} stationary columns, {} failed entities, {} short columns, {} non-finite columns, {} unreadable",
            report.entities_visited,
            report.stationary_count(),
            report.failed.len(),
            report.insufficient.len(),
            report.non_finite.len(),
            report.load_failures.len()
        );
        Ok(report)
    }

    pub fn diagnose(
        &self,
        id: &EntityId,
        record: &EntityRecord,
        sink: &mut dyn DiagnosticSink,
    ) -> EntityDiagnostics {
        let columns = Column::ALL
            .iter()
            .map(|&column| {
                let series = record.table.column(column);
                let label = format!("{}/{}", id, column);
                let verdict = self
                    .classifier
                    .classify_observed(&series, &label, sink)
                    .map(|c| c.verdict);
                if let Err(e) = &verdict {
                    debug!("{}: {}", label, e);
                }
                ColumnOutcome { column, verdict, peak: record.table.peak(column) }
            })
            .collect();

        let ratio = revision_contributor_ratio(id, record);
        if let Err(e) = &ratio {
            warn!("{}", e);
        }

        EntityDiagnostics {
            id: id.clone(),
            name: record.name.clone(),
            columns,
            ratio,
            last_month: record.table.last_month(),
        }
    }
}
