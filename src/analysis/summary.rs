//! Distribution summary of stored series lengths.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthSummary {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub median: f64,
    pub p95: f64,
    pub zero_length: usize,
    pub at_p95: usize,
    pub at_max: usize,
}

impl LengthSummary {
    /// `None` when there are no lengths.
    pub fn from_lengths(lengths: &[usize]) -> Option<Self> {
        if lengths.is_empty() {
            return None;
        }
        let mut sorted = lengths.to_vec();
        sorted.sort_unstable();

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<usize>() as f64 / n;
        let std = (sorted.iter().map(|l| (*l as f64 - mean).powi(2)).sum::<f64>() / n).sqrt();
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let p95 = percentile(&sorted, 95.0);

        Some(Self {
            count: sorted.len(),
            min,
            max,
            mean,
            std,
            median: percentile(&sorted, 50.0),
            p95,
            zero_length: sorted.iter().filter(|l| **l == 0).count(),
            at_p95: sorted.iter().filter(|l| **l as f64 == p95).count(),
            at_max: sorted.iter().filter(|l| **l == max).count(),
        })
    }
}

/// Linear interpolation between closest ranks of an ascending slice.
fn percentile(sorted: &[usize], q: f64) -> f64 {
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] as f64 + (sorted[hi] as f64 - sorted[lo] as f64) * frac
}

impl fmt::Display for LengthSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Min: {}", self.min)?;
        writeln!(f, "Max: {}", self.max)?;
        writeln!(f, "Mean: {}", self.mean)?;
        writeln!(f, "Std: {}", self.std)?;
        writeln!(f, "Median (50-tile): {}", self.median)?;
        writeln!(f, "95-tile: {}", self.p95)?;
        writeln!(f, "zero-length: {}", self.zero_length)?;
        writeln!(f, "95-length: {}", self.at_p95)?;
        write!(f, "max-length: {}", self.at_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_small_sample() {
        let summary = LengthSummary::from_lengths(&[0, 10, 20, 30, 40]).unwrap();
        assert_eq!(summary.min, 0);
        assert_eq!(summary.max, 40);
        assert_eq!(summary.mean, 20.0);
        assert!((summary.std - 200f64.sqrt()).abs() < 1e-12);
        assert_eq!(summary.median, 20.0);
        assert!((summary.p95 - 38.0).abs() < 1e-12);
        assert_eq!(summary.zero_length, 1);
        assert_eq!(summary.at_max, 1);
        assert_eq!(summary.at_p95, 0);
    }

    #[test]
    fn test_empty() {
        assert!(LengthSummary::from_lengths(&[]).is_none());
    }
}
