//! Stress-run configuration.
//!
//! Immutable configuration for both sub-engines, built through
//! [`StressConfigBuilder`] with validation at build time.

use crate::error::ConfigError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of time steps allowed.
pub const MAX_STEPS: usize = 1_000;

/// One trading day as a year fraction.
pub const TRADING_DAY: f64 = 1.0 / 252.0;

/// Stress-engine configuration.
///
/// # Examples
///
/// ```
/// use margin_risk::StressConfig;
///
/// let config = StressConfig::builder()
///     .n_paths(100_000)
///     .seed(20)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_paths(), 100_000);
/// assert_eq!(config.n_steps(), 2);
/// assert_eq!(config.percentile(), 90.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StressConfig {
    n_paths: usize,
    n_steps: usize,
    dt: f64,
    seed: Option<u64>,
    percentile: f64,
    target_risk_ratio: f64,
}

impl StressConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> StressConfigBuilder {
        StressConfigBuilder::default()
    }

    /// Number of simulation paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of time steps (reporting horizons `T+0..T+n-1`).
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Step size as a year fraction.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Optional seed for reproducibility.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Risk-ratio VaR percentile.
    #[inline]
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Target risk ratio for supplement sizing.
    #[inline]
    pub fn target_risk_ratio(&self) -> f64 {
        self.target_risk_ratio
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(ConfigError::InvalidPathCount(self.n_paths));
        }
        if self.n_steps == 0 || self.n_steps > MAX_STEPS {
            return Err(ConfigError::InvalidStepCount(self.n_steps));
        }
        if !(self.dt > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "dt",
                value: format!("{} (must be positive)", self.dt),
            });
        }
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(ConfigError::InvalidParameter {
                name: "percentile",
                value: format!("{} (must be in [0, 100])", self.percentile),
            });
        }
        if !(self.target_risk_ratio > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "target_risk_ratio",
                value: format!("{} (must be positive)", self.target_risk_ratio),
            });
        }
        Ok(())
    }
}

/// Builder for [`StressConfig`].
///
/// Only the path count must be supplied; every other field has the
/// production default (two daily steps, 90th percentile, 0.95 target).
#[derive(Clone, Debug)]
pub struct StressConfigBuilder {
    n_paths: Option<usize>,
    n_steps: usize,
    dt: f64,
    seed: Option<u64>,
    percentile: f64,
    target_risk_ratio: f64,
}

impl Default for StressConfigBuilder {
    fn default() -> Self {
        Self {
            n_paths: None,
            n_steps: 2,
            dt: TRADING_DAY,
            seed: None,
            percentile: 90.0,
            target_risk_ratio: 0.95,
        }
    }
}

impl StressConfigBuilder {
    /// Sets the number of simulation paths.
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the number of time steps.
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = n_steps;
        self
    }

    /// Sets the step size (year fraction).
    #[inline]
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Sets the RNG seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the VaR percentile.
    #[inline]
    pub fn percentile(mut self, percentile: f64) -> Self {
        self.percentile = percentile;
        self
    }

    /// Sets the target risk ratio.
    #[inline]
    pub fn target_risk_ratio(mut self, target: f64) -> Self {
        self.target_risk_ratio = target;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the path count is unset or any field
    /// is out of range.
    pub fn build(self) -> Result<StressConfig, ConfigError> {
        let n_paths = self.n_paths.ok_or(ConfigError::InvalidParameter {
            name: "n_paths",
            value: "must be specified".to_string(),
        })?;
        let config = StressConfig {
            n_paths,
            n_steps: self.n_steps,
            dt: self.dt,
            seed: self.seed,
            percentile: self.percentile,
            target_risk_ratio: self.target_risk_ratio,
        };
        config.validate()?;
        Ok(config)
    }
}
