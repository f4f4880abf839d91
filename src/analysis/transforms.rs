//! Series transforms applied between classification stages, and the rolling
//! statistics emitted alongside them.

use serde::Serialize;

/// First-order differencing; the result is one element shorter.
pub fn difference(series: &[f64]) -> Vec<f64> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Natural log of every element, or `None` if any element is not strictly positive.
pub fn natural_log(series: &[f64]) -> Option<Vec<f64>> {
    if series.iter().any(|v| !(*v > 0.0) || !v.is_finite()) {
        return None;
    }
    Some(series.iter().map(|v| v.ln()).collect())
}

/// Trailing-window mean and sample standard deviation. The first `window - 1`
/// positions have no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingStats {
    pub window: usize,
    pub mean: Vec<Option<f64>>,
    pub std: Vec<Option<f64>>,
}

impl RollingStats {
    pub fn compute(series: &[f64], window: usize) -> Self {
        let mut mean = vec![None; series.len()];
        let mut std = vec![None; series.len()];
        if window >= 1 && series.len() >= window {
            for (end, slice) in series.windows(window).enumerate().map(|(i, s)| (i + window - 1, s)) {
                let n = window as f64;
                let m = slice.iter().sum::<f64>() / n;
                mean[end] = Some(m);
                if window > 1 {
                    let ss: f64 = slice.iter().map(|v| (v - m).powi(2)).sum();
                    std[end] = Some((ss / (n - 1.0)).sqrt());
                }
            }
        }
        Self { window, mean, std }
    }
}
