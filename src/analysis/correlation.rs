//! Sample autocorrelation and partial autocorrelation.

/// `min(10 * log10(n), n - 1)` lags.
pub fn default_lags(n: usize) -> usize {
    if n < 2 {
        return 0;
    }
    ((10.0 * (n as f64).log10()) as usize).min(n - 1)
}

/// Autocorrelations at lags `0..=nlags` using the biased (divide by `n`)
/// autocovariance. `None` for an empty or constant series.
pub fn acf(series: &[f64], nlags: usize) -> Option<Vec<f64>> {
    let n = series.len();
    if n == 0 {
        return None;
    }
    let mean = series.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = series.iter().map(|v| v - mean).collect();
    let autocov = |k: usize| -> f64 {
        centered[k..].iter().zip(&centered).map(|(a, b)| a * b).sum::<f64>() / n as f64
    };
    let c0 = autocov(0);
    if !(c0 > 0.0) {
        return None;
    }
    Some((0..=nlags.min(n - 1)).map(|k| autocov(k) / c0).collect())
}

/// Partial autocorrelations at lags `0..=nlags`, Yule-Walker equations solved
/// by Levinson-Durbin recursion. Stops early if the recursion becomes singular.
pub fn pacf(series: &[f64], nlags: usize) -> Option<Vec<f64>> {
    let r = acf(series, nlags)?;
    let nlags = r.len() - 1;
    let mut out = vec![1.0];
    let mut phi: Vec<f64> = Vec::new();
    for k in 1..=nlags {
        let num = r[k] - (1..k).map(|j| phi[j - 1] * r[k - j]).sum::<f64>();
        let den = 1.0 - (1..k).map(|j| phi[j - 1] * r[j]).sum::<f64>();
        if den.abs() < f64::EPSILON {
            break;
        }
        let phi_kk = num / den;
        let mut next: Vec<f64> = (1..k).map(|j| phi[j - 1] - phi_kk * phi[k - j - 1]).collect();
        next.push(phi_kk);
        phi = next;
        out.push(phi_kk);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lags() {
        assert_eq!(default_lags(100), 20);
        assert_eq!(default_lags(5), 4);
        assert_eq!(default_lags(1), 0);
    }

    #[test]
    fn test_alternating_series() {
        let series: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let r = acf(&series, 2).unwrap();
        assert_eq!(r[0], 1.0);
        assert!((r[1] + 0.98).abs() < 1e-9);
        let p = pacf(&series, 2).unwrap();
        assert!((p[1] - r[1]).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_has_no_acf() {
        assert!(acf(&[3.0; 10], 3).is_none());
    }
}
