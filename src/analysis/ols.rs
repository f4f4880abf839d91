//! Ordinary least squares via modified Gram-Schmidt QR.

/// Relative threshold below which a column is treated as linearly dependent
/// on the previous ones.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub params: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub ssr: f64,
    pub nobs: usize,
    /// Mean of the squared response, used to judge whether the residuals vanished.
    y_scale: f64,
}

impl OlsFit {
    pub fn nparams(&self) -> usize {
        self.params.len()
    }

    pub fn df_resid(&self) -> usize {
        self.nobs - self.params.len()
    }

    /// Gaussian log-likelihood at the fitted parameters.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every regressor including the constant.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.nparams() as f64
    }

    pub fn t_value(&self, j: usize) -> f64 {
        self.params[j] / self.std_errors[j]
    }

    /// True when the residual variance is numerically zero (a perfect fit).
    pub fn is_degenerate(&self) -> bool {
        let sigma2 = self.ssr / self.df_resid() as f64;
        !(sigma2 > f64::EPSILON * self.y_scale.max(f64::MIN_POSITIVE))
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Regresses `y` on the given columns. Returns `None` when there are not more
/// observations than regressors or when the columns are rank deficient.
pub fn fit(y: &[f64], columns: &[Vec<f64>]) -> Option<OlsFit> {
    let n = y.len();
    let k = columns.len();
    if k == 0 || n <= k || columns.iter().any(|c| c.len() != n) {
        return None;
    }

    let mut q: Vec<Vec<f64>> = Vec::with_capacity(k);
    let mut r = vec![vec![0.0; k]; k];
    for (j, column) in columns.iter().enumerate() {
        let norm = dot(column, column).sqrt();
        let mut v = column.clone();
        // Two orthogonalisation passes keep Q orthogonal for badly scaled columns.
        for _ in 0..2 {
            for (i, qi) in q.iter().enumerate() {
                let rij = dot(qi, &v);
                r[i][j] += rij;
                for (vt, qt) in v.iter_mut().zip(qi) {
                    *vt -= rij * qt;
                }
            }
        }
        let rjj = dot(&v, &v).sqrt();
        if !(rjj > RANK_TOLERANCE * norm) {
            return None;
        }
        r[j][j] = rjj;
        v.iter_mut().for_each(|vt| *vt /= rjj);
        q.push(v);
    }

    let qty: Vec<f64> = q.iter().map(|qi| dot(qi, y)).collect();
    let params = back_substitute(&r, &qty);

    let ssr: f64 = (0..n)
        .map(|t| {
            let fitted: f64 = columns.iter().zip(&params).map(|(c, b)| c[t] * b).sum();
            (y[t] - fitted).powi(2)
        })
        .sum();
    let sigma2 = ssr / (n - k) as f64;

    // diag((X'X)^-1) = row norms of R^-1
    let r_inv = upper_inverse(&r);
    let std_errors = (0..k)
        .map(|j| (sigma2 * r_inv[j].iter().map(|v| v * v).sum::<f64>()).sqrt())
        .collect();

    let y_scale = dot(y, y) / n as f64;
    Some(OlsFit { params, std_errors, ssr, nobs: n, y_scale })
}

fn back_substitute(r: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let k = b.len();
    let mut x = vec![0.0; k];
    for i in (0..k).rev() {
        let tail: f64 = (i + 1..k).map(|j| r[i][j] * x[j]).sum();
        x[i] = (b[i] - tail) / r[i][i];
    }
    x
}

fn upper_inverse(r: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = r.len();
    let mut inv = vec![vec![0.0; k]; k];
    for col in 0..k {
        let mut e = vec![0.0; k];
        e[col] = 1.0;
        let x = back_substitute(r, &e);
        for row in 0..k {
            inv[row][col] = x[row];
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_line_with_noise() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let noise = [0.3, -0.2, 0.1, -0.4, 0.2];
        let y: Vec<f64> = x.iter().enumerate().map(|(i, xi)| 1.0 + 2.0 * xi + noise[i % 5]).collect();
        let fit = fit(&y, &[x.clone(), vec![1.0; 20]]).unwrap();

        assert!((fit.params[0] - 2.0).abs() < 0.05);
        assert!((fit.params[1] - 1.0).abs() < 0.5);
        assert!(fit.std_errors.iter().all(|s| *s > 0.0));
        assert!(!fit.is_degenerate());
        assert_eq!(fit.df_resid(), 18);
    }

    #[test]
    fn test_collinear_columns_rejected() {
        let a: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let b: Vec<f64> = a.iter().map(|v| 3.0 * v).collect();
        assert!(fit(&vec![1.0; 10], &[a, b]).is_none());
    }

    #[test]
    fn test_perfect_fit_is_degenerate() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 4.0 - v).collect();
        let fit = fit(&y, &[x, vec![1.0; 10]]).unwrap();
        assert!(fit.is_degenerate());
    }

    #[test]
    fn test_too_few_observations() {
        assert!(fit(&[1.0, 2.0], &[vec![1.0, 2.0], vec![1.0, 1.0]]).is_none());
    }
}
