//! Augmented Dickey-Fuller unit-root test with a constant term.
//!
//! Lag length is chosen by AIC over `0..=max_lag`, all candidate regressions
//! sharing the sample trimmed at `max_lag`. The final regression is refitted on
//! the sample trimmed at the chosen lag. P-values use MacKinnon's (1994)
//! response surface; critical values use MacKinnon's (2010) finite-sample table.

use serde::{Deserialize, Serialize};

use crate::analysis::ols;
use crate::analysis::stationarity::StationarityError;

/// Shortest series the test accepts at all.
pub const MIN_SERIES_LEN: usize = 4;

// MacKinnon (1994), one variable, constant only.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010), one variable, constant only: 1%, 5%, 10%.
const TAU_C_2010: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_percent: f64,
    pub five_percent: f64,
    pub ten_percent: f64,
}

impl CriticalValues {
    pub fn for_nobs(nobs: usize) -> Self {
        let inv = 1.0 / nobs as f64;
        let at = |row: &[f64; 4]| row[0] + row[1] * inv + row[2] * inv.powi(2) + row[3] * inv.powi(3);
        Self {
            one_percent: at(&TAU_C_2010[0]),
            five_percent: at(&TAU_C_2010[1]),
            ten_percent: at(&TAU_C_2010[2]),
        }
    }

    pub fn values(&self) -> [f64; 3] {
        [self.one_percent, self.five_percent, self.ten_percent]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-statistic of the lagged level; NaN when the regression was degenerate,
    /// negative infinity for a constant series.
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub nobs: usize,
    pub critical_values: CriticalValues,
}

/// Any test producing an ADF-shaped result. The classifier is generic over it.
pub trait UnitRootTest {
    fn test(&self, series: &[f64]) -> Result<AdfResult, StationarityError>;
}

#[derive(Debug, Clone, Default)]
pub struct AugmentedDickeyFuller {
    pub max_lag: Option<usize>,
}

impl AugmentedDickeyFuller {
    pub fn new(max_lag: Option<usize>) -> Self {
        Self { max_lag }
    }

    fn max_lag_for(&self, n: usize) -> Result<usize, StationarityError> {
        let insufficient = StationarityError::InsufficientData { len: n, required: MIN_SERIES_LEN };
        if n < MIN_SERIES_LEN {
            return Err(insufficient);
        }
        // Schwert's rule, capped so that the regression keeps enough observations.
        let default = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
        let cap = (n / 2) as isize - 2;
        if cap < 0 {
            return Err(insufficient);
        }
        Ok(self.max_lag.unwrap_or(default).min(cap as usize))
    }
}

/// Regression sample for a given trimming lag: response `Δx_t`, lagged level
/// `x_{t-1}` and `lags` lagged differences, over `t` in `trim..n-1`.
struct Design {
    response: Vec<f64>,
    level: Vec<f64>,
    lagged: Vec<Vec<f64>>,
}

impl Design {
    fn build(series: &[f64], diff: &[f64], trim: usize, lags: usize) -> Self {
        let rows = trim..diff.len();
        Self {
            response: rows.clone().map(|t| diff[t]).collect(),
            level: rows.clone().map(|t| series[t]).collect(),
            lagged: (1..=lags).map(|j| rows.clone().map(|t| diff[t - j]).collect()).collect(),
        }
    }

    fn nobs(&self) -> usize {
        self.response.len()
    }

    /// Lagged level first, lagged differences, constant last.
    fn columns(&self) -> Vec<Vec<f64>> {
        let mut columns = Vec::with_capacity(self.lagged.len() + 2);
        columns.push(self.level.clone());
        columns.extend(self.lagged.iter().cloned());
        columns.push(vec![1.0; self.nobs()]);
        columns
    }
}

fn is_constant(series: &[f64]) -> bool {
    let first = series[0];
    let tolerance = f64::EPSILON * first.abs().max(1.0);
    series.iter().all(|v| (v - first).abs() <= tolerance)
}

impl UnitRootTest for AugmentedDickeyFuller {
    fn test(&self, series: &[f64]) -> Result<AdfResult, StationarityError> {
        let n = series.len();
        let max_lag = self.max_lag_for(n)?;
        if series.iter().any(|v| !v.is_finite()) {
            return Err(StationarityError::NonFinite);
        }

        if is_constant(series) {
            return Ok(AdfResult {
                statistic: f64::NEG_INFINITY,
                p_value: 0.0,
                used_lag: 0,
                nobs: n - 1,
                critical_values: CriticalValues::for_nobs(n - 1),
            });
        }

        let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

        let mut best: Option<(f64, usize)> = None;
        for lag in 0..=max_lag {
            let design = Design::build(series, &diff, max_lag, lag);
            let Some(fit) = ols::fit(&design.response, &design.columns()) else {
                continue;
            };
            if fit.is_degenerate() {
                continue;
            }
            let aic = fit.aic();
            if best.map_or(true, |(b, _)| aic < b) {
                best = Some((aic, lag));
            }
        }

        let Some((_, used_lag)) = best else {
            return Ok(degenerate(max_lag, n - 1 - max_lag));
        };

        let design = Design::build(series, &diff, used_lag, used_lag);
        let nobs = design.nobs();
        let fit = match ols::fit(&design.response, &design.columns()) {
            Some(fit) if !fit.is_degenerate() => fit,
            _ => return Ok(degenerate(used_lag, nobs)),
        };

        let statistic = fit.t_value(0);
        Ok(AdfResult {
            statistic,
            p_value: mackinnon_p_value(statistic),
            used_lag,
            nobs,
            critical_values: CriticalValues::for_nobs(nobs),
        })
    }
}

fn degenerate(used_lag: usize, nobs: usize) -> AdfResult {
    AdfResult {
        statistic: f64::NAN,
        p_value: f64::NAN,
        used_lag,
        nobs,
        critical_values: CriticalValues::for_nobs(nobs),
    }
}

/// Approximate asymptotic p-value of an ADF statistic (constant, one variable).
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let z = if statistic <= TAU_STAR {
        polyval(&TAU_SMALL_P, statistic)
    } else {
        polyval(&TAU_LARGE_P, statistic)
    };
    normal_cdf(z)
}

/// `c[0] + c[1] x + c[2] x^2 + ...`
fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

pub fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

/// Complementary error function, fractional error below 1.2e-7.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let r = t * poly.exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf_reference_points() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.959_964) - 0.975).abs() < 1e-6);
        assert!((normal_cdf(-1.644_854) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_p_value_at_asymptotic_five_percent() {
        let p = mackinnon_p_value(-2.86154);
        assert!((p - 0.05).abs() < 0.005, "p = {}", p);
    }

    #[test]
    fn test_p_value_bounds() {
        assert_eq!(mackinnon_p_value(3.0), 1.0);
        assert_eq!(mackinnon_p_value(-25.0), 0.0);
        assert_eq!(mackinnon_p_value(f64::NEG_INFINITY), 0.0);
        assert!(mackinnon_p_value(f64::NAN).is_nan());
        assert!(mackinnon_p_value(-1.0) > mackinnon_p_value(-2.0));
    }

    #[test]
    fn test_critical_values_approach_asymptotic() {
        let large = CriticalValues::for_nobs(1_000_000);
        assert!((large.five_percent + 2.86154).abs() < 1e-4);
        let small = CriticalValues::for_nobs(25);
        assert!(small.one_percent < small.five_percent && small.five_percent < small.ten_percent);
        assert!(small.five_percent < large.five_percent);
    }

    #[test]
    fn test_short_series_rejected() {
        let adf = AugmentedDickeyFuller::default();
        assert!(matches!(
            adf.test(&[1.0, 2.0, 3.0]),
            Err(StationarityError::InsufficientData { len: 3, .. })
        ));
    }

    #[test]
    fn test_lag_window() {
        let adf = AugmentedDickeyFuller::default();
        assert_eq!(adf.max_lag_for(100).unwrap(), 12);
        assert_eq!(adf.max_lag_for(24).unwrap(), 9);
        assert_eq!(adf.max_lag_for(8).unwrap(), 2);
        assert_eq!(AugmentedDickeyFuller::new(Some(1)).max_lag_for(100).unwrap(), 1);
    }
}
