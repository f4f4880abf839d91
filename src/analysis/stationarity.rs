//! Stationarity classification of one series.
//!
//! Three stages are tried in a fixed order, each on a transform of the input
//! series: as given, first difference, natural log of the original. The first
//! stage passing the decision rule ends classification; if none does, the
//! verdict is non-stationary with the log transform as the last one tried.
//!
//! The decision rule is deliberately loose: a stage passes when the ADF p-value
//! is below `adf_p_threshold` (0.5 by default) and at least one critical value
//! is greater than the test statistic.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::analysis::adf::{AdfResult, AugmentedDickeyFuller, UnitRootTest};
use crate::analysis::correlation;
use crate::analysis::sink::{DiagnosticRecord, DiagnosticSink, NullSink};
use crate::analysis::transforms::{self, RollingStats};
use crate::config::StationarityConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StationarityError {
    #[error("series of length {len} is too short for the unit-root test (need at least {required})")]
    InsufficientData { len: usize, required: usize },
    #[error("series contains non-finite values")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    None,
    Difference,
    Log,
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::None => write!(f, "none"),
            Transform::Difference => write!(f, "difference"),
            Transform::Log => write!(f, "log"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationarityVerdict {
    pub transform_applied: Transform,
    pub is_stationary: bool,
    pub series_length: usize,
}

/// What happened at one stage. `result` is `None` when the transformed series
/// could not be tested (too short after differencing, non-positive before log).
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub transform: Transform,
    pub result: Option<AdfResult>,
    pub stationary: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub verdict: StationarityVerdict,
    pub stages: Vec<StageOutcome>,
}

/// The decision rule shared by every stage.
pub fn passes(result: &AdfResult, p_threshold: f64) -> bool {
    result.p_value < p_threshold
        && result.critical_values.values().iter().any(|c| *c > result.statistic)
}

pub struct StationarityClassifier<T: UnitRootTest = AugmentedDickeyFuller> {
    config: StationarityConfig,
    test: T,
}

impl StationarityClassifier<AugmentedDickeyFuller> {
    pub fn new(config: StationarityConfig) -> Self {
        let test = AugmentedDickeyFuller::new(config.max_lag);
        Self { config, test }
    }
}

impl<T: UnitRootTest> StationarityClassifier<T> {
    pub fn with_test(config: StationarityConfig, test: T) -> Self {
        Self { config, test }
    }

    pub fn config(&self) -> &StationarityConfig {
        &self.config
    }

    pub fn classify(&self, series: &[f64]) -> Result<StationarityVerdict, StationarityError> {
        self.classify_observed(series, "", &mut NullSink).map(|c| c.verdict)
    }

    /// Classifies `series`, emitting rolling statistics for every stage and a
    /// correlogram of the differenced series when the raw stage fails.
    pub fn classify_observed(
        &self,
        series: &[f64],
        label: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Classification, StationarityError> {
        let mut stages = Vec::with_capacity(3);

        self.emit_rolling(sink, label, Transform::None, series);
        let raw = self.test.test(series)?;
        let raw_stationary = passes(&raw, self.config.adf_p_threshold);
        stages.push(StageOutcome {
            transform: Transform::None,
            result: Some(raw),
            stationary: raw_stationary,
        });
        if raw_stationary {
            return Ok(self.finish(series, Transform::None, true, stages, label));
        }

        let differenced = transforms::difference(series);
        self.emit_rolling(sink, label, Transform::Difference, &differenced);
        self.emit_correlogram(sink, label, &differenced);
        let outcome = self.stage(Transform::Difference, Some(&differenced));
        let stationary = outcome.stationary;
        stages.push(outcome);
        if stationary {
            return Ok(self.finish(series, Transform::Difference, true, stages, label));
        }

        let logged = transforms::natural_log(series);
        if let Some(logged) = &logged {
            self.emit_rolling(sink, label, Transform::Log, logged);
        }
        let outcome = self.stage(Transform::Log, logged.as_deref());
        let stationary = outcome.stationary;
        stages.push(outcome);
        Ok(self.finish(series, Transform::Log, stationary, stages, label))
    }

    fn stage(&self, transform: Transform, series: Option<&[f64]>) -> StageOutcome {
        let result = series.and_then(|s| match self.test.test(s) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!("{} stage not testable: {}", transform, e);
                None
            }
        });
        let stationary = result.as_ref().map_or(false, |r| passes(r, self.config.adf_p_threshold));
        StageOutcome { transform, result, stationary }
    }

    fn finish(
        &self,
        series: &[f64],
        transform: Transform,
        is_stationary: bool,
        stages: Vec<StageOutcome>,
        label: &str,
    ) -> Classification {
        debug!(
            "{} classified after {} stage(s): transform={}, stationary={}",
            label,
            stages.len(),
            transform,
            is_stationary
        );
        Classification {
            verdict: StationarityVerdict {
                transform_applied: transform,
                is_stationary,
                series_length: series.len(),
            },
            stages,
        }
    }

    fn emit_rolling(&self, sink: &mut dyn DiagnosticSink, label: &str, stage: Transform, values: &[f64]) {
        sink.emit(DiagnosticRecord::Rolling {
            series: label.to_string(),
            stage,
            values: values.to_vec(),
            stats: RollingStats::compute(values, self.config.rolling_window),
        });
    }

    fn emit_correlogram(&self, sink: &mut dyn DiagnosticSink, label: &str, values: &[f64]) {
        let nlags = self.config.acf_lags.unwrap_or_else(|| correlation::default_lags(values.len()));
        if let (Some(acf), Some(pacf)) =
            (correlation::acf(values, nlags), correlation::pacf(values, nlags))
        {
            sink.emit(DiagnosticRecord::Correlogram {
                series: label.to_string(),
                stage: Transform::Difference,
                acf,
                pacf,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::adf::CriticalValues;
    use crate::analysis::sink::CollectingSink;

    /// Passes any series whose values all lie below `limit`.
    struct BelowLimit {
        limit: f64,
    }

    impl UnitRootTest for BelowLimit {
        fn test(&self, series: &[f64]) -> Result<AdfResult, StationarityError> {
            if series.len() < 4 {
                return Err(StationarityError::InsufficientData { len: series.len(), required: 4 });
            }
            let ok = series.iter().all(|v| *v < self.limit);
            Ok(AdfResult {
                statistic: if ok { -5.0 } else { 0.0 },
                p_value: if ok { 0.01 } else { 0.9 },
                used_lag: 0,
                nobs: series.len() - 1,
                critical_values: CriticalValues::for_nobs(series.len() - 1),
            })
        }
    }

    fn classifier(limit: f64) -> StationarityClassifier<BelowLimit> {
        StationarityClassifier::with_test(StationarityConfig::default(), BelowLimit { limit })
    }

    #[test]
    fn test_decision_rule_direction() {
        let mut result = AdfResult {
            statistic: -3.0,
            p_value: 0.4,
            used_lag: 0,
            nobs: 100,
            critical_values: CriticalValues::for_nobs(100),
        };
        assert!(passes(&result, 0.5));
        result.p_value = 0.5;
        assert!(!passes(&result, 0.5));
        result.p_value = 0.1;
        result.statistic = 5.0;
        assert!(!passes(&result, 0.5));
    }

    #[test]
    fn test_log_stage_reached_on_original_series() {
        // raw fails (values up to 50), differences fail (step 10), log passes (ln 50 < 4)
        let series = [10.0, 20.0, 30.0, 40.0, 50.0, 40.0, 30.0, 20.0];
        let classification =
            classifier(5.0).classify_observed(&series, "x", &mut NullSink).unwrap();
        assert_eq!(classification.verdict.transform_applied, Transform::Log);
        assert!(classification.verdict.is_stationary);
        assert_eq!(classification.verdict.series_length, 8);
        assert_eq!(classification.stages.len(), 3);
    }

    #[test]
    fn test_all_stages_fail() {
        let series = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0];
        let verdict = classifier(1.0).classify(&series).unwrap();
        assert_eq!(verdict.transform_applied, Transform::Log);
        assert!(!verdict.is_stationary);
    }

    #[test]
    fn test_non_positive_series_skips_log_test() {
        let series = [0.0, 20.0, 0.0, 20.0, 0.0, 20.0];
        let classification =
            classifier(1.0).classify_observed(&series, "x", &mut NullSink).unwrap();
        assert!(!classification.verdict.is_stationary);
        assert_eq!(classification.stages[2].result, None);
    }

    #[test]
    fn test_short_difference_stage_fails_without_error() {
        let series = [10.0, 20.0, 30.0, 40.0];
        let classification =
            classifier(5.0).classify_observed(&series, "x", &mut NullSink).unwrap();
        assert_eq!(classification.stages[1].result, None);
        assert_eq!(classification.verdict.transform_applied, Transform::Log);
        assert!(classification.verdict.is_stationary);
    }

    #[test]
    fn test_diagnostics_emitted_per_stage() {
        let series = [10.0, 20.0, 30.0, 40.0, 50.0, 40.0, 30.0, 20.0];
        let mut sink = CollectingSink::default();
        classifier(5.0).classify_observed(&series, "e/num_rev", &mut sink).unwrap();
        let rolling = sink
            .records
            .iter()
            .filter(|r| matches!(r, DiagnosticRecord::Rolling { .. }))
            .count();
        let correlograms = sink
            .records
            .iter()
            .filter(|r| matches!(r, DiagnosticRecord::Correlogram { .. }))
            .count();
        assert_eq!(rolling, 3);
        assert_eq!(correlograms, 1);
    }
}
