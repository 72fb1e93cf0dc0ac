//! Correlated underlying-return path generation.
//!
//! The covariance table stores volatilities on the diagonal and
//! correlations in the upper triangle. For the underlyings actually
//! held, the generator symmetrises that representation into a proper
//! covariance `C[i,j] = ρ[i,j] σ_i σ_j` (with `C[i,i] = σ_i²`), takes
//! its Cholesky factor `L`, and evolves log returns per step as
//!
//! ```text
//! log_r = (μ - σ²/2) · dt + (L · Z) · √dt
//! ```
//!
//! accumulated over steps, returning simple returns
//! `r = exp(cum_log_r) - 1` in a flat cube of shape
//! `(n_step, underlying, path)`.

use margin_core::math::CholeskyFactor;
use margin_models::holdings::Leg;
use tracing::debug;

use crate::config::StressConfig;
use crate::error::StressError;
use crate::rng::StressRng;
use crate::tables::{CovarianceTable, DriftTable};

/// Distinct underlying tags of a holding, in first-appearance order.
#[derive(Clone, Debug, PartialEq)]
pub struct UnderlyingIndex {
    labels: Vec<String>,
}

impl UnderlyingIndex {
    /// Collects the distinct underlying tags across a set of legs.
    pub fn from_legs<'a>(legs: impl IntoIterator<Item = &'a Leg>) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for leg in legs {
            let udl = leg.underlying();
            if !labels.iter().any(|l| l == udl) {
                labels.push(udl.to_string());
            }
        }
        Self { labels }
    }

    /// Number of distinct underlyings.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index of an underlying tag.
    pub fn position(&self, udl: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == udl)
    }

    /// Labels in index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Simple returns per `(step, underlying, path)`, flat row-major.
#[derive(Clone, Debug)]
pub struct ReturnPaths {
    n_step: usize,
    n_underlying: usize,
    n_path: usize,
    data: Vec<f64>,
}

impl ReturnPaths {
    /// Number of steps.
    pub fn n_step(&self) -> usize {
        self.n_step
    }

    /// Number of underlyings.
    pub fn n_underlying(&self) -> usize {
        self.n_underlying
    }

    /// Number of paths.
    pub fn n_path(&self) -> usize {
        self.n_path
    }

    #[inline]
    fn offset(&self, step: usize, underlying: usize) -> usize {
        (step * self.n_underlying + underlying) * self.n_path
    }

    /// The per-path return slice of one `(step, underlying)` cell.
    #[inline]
    pub fn slice(&self, step: usize, underlying: usize) -> &[f64] {
        let start = self.offset(step, underlying);
        &self.data[start..start + self.n_path]
    }
}

/// Generates correlated return paths for the indexed underlyings.
///
/// # Errors
///
/// - [`StressError::MissingUnderlying`] when a held underlying has no
///   covariance row
/// - [`StressError::SingularCovariance`] when the symmetrised matrix is
///   not positive definite
pub fn generate_return_paths(
    index: &UnderlyingIndex,
    cov: &CovarianceTable,
    drift: &DriftTable,
    config: &StressConfig,
) -> Result<ReturnPaths, StressError> {
    let n_underlying = index.len();
    let n_step = config.n_steps();
    let n_path = config.n_paths();

    // Select covariance rows for the held underlyings.
    let positions: Vec<usize> = index
        .labels()
        .iter()
        .map(|label| {
            cov.position(label)
                .ok_or_else(|| StressError::missing_underlying(label))
        })
        .collect::<Result<_, _>>()?;

    // Symmetrise: diagonal carries vols, the upper triangle (in
    // selected order) carries correlations.
    let vols: Vec<f64> = positions.iter().map(|&p| cov.get(p, p)).collect();
    let mut covariance = vec![0.0; n_underlying * n_underlying];
    for i in 0..n_underlying {
        covariance[i * n_underlying + i] = vols[i] * vols[i];
        for j in (i + 1)..n_underlying {
            let rho = cov.get(positions[i], positions[j]);
            let value = rho * vols[i] * vols[j];
            covariance[i * n_underlying + j] = value;
            covariance[j * n_underlying + i] = value;
        }
    }
    let factor = CholeskyFactor::decompose(&covariance, n_underlying)?;

    let mu: Vec<f64> = index.labels().iter().map(|l| drift.get(l)).collect();
    let drift_dt: Vec<f64> = mu
        .iter()
        .zip(&vols)
        .map(|(m, v)| (m - 0.5 * v * v) * config.dt())
        .collect();
    let sqrt_dt = config.dt().sqrt();

    debug!(
        underlyings = n_underlying,
        steps = n_step,
        paths = n_path,
        "generating return paths"
    );

    // First pass fills cumulative log returns; the second maps them to
    // simple returns in place.
    let mut rng = StressRng::new(config.seed());
    let mut data = vec![0.0; n_step * n_underlying * n_path];
    let mut z = vec![0.0; n_underlying];
    for step in 0..n_step {
        for path in 0..n_path {
            rng.fill_normal(&mut z);
            for u in 0..n_underlying {
                let shock = factor.transform_row(u, &z);
                let log_r = drift_dt[u] + shock * sqrt_dt;
                let idx = (step * n_underlying + u) * n_path + path;
                let previous = if step == 0 {
                    0.0
                } else {
                    data[((step - 1) * n_underlying + u) * n_path + path]
                };
                data[idx] = previous + log_r;
            }
        }
    }
    for value in data.iter_mut() {
        *value = value.exp() - 1.0;
    }

    Ok(ReturnPaths {
        n_step,
        n_underlying,
        n_path,
        data,
    })
}
