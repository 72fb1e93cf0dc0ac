//! Run configuration.
//!
//! A TOML file provides defaults for the stress parameters and the
//! report directory; command-line flags override individual values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CliError;

/// Stress-engine defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct StressSection {
    /// Monte Carlo path count
    #[serde(default = "default_n_paths")]
    pub n_paths: usize,

    /// Simulation steps (reporting horizons)
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,

    /// Risk-ratio VaR percentile
    #[serde(default = "default_percentile")]
    pub percentile: f64,

    /// Target risk ratio for supplement sizing
    #[serde(default = "default_target_risk_ratio")]
    pub target_risk_ratio: f64,

    /// Optional RNG seed
    pub seed: Option<u64>,

    /// Scenario grid of underlying returns
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<f64>,
}

fn default_n_paths() -> usize {
    100_000
}

fn default_n_steps() -> usize {
    2
}

fn default_percentile() -> f64 {
    90.0
}

fn default_target_risk_ratio() -> f64 {
    0.95
}

fn default_scenarios() -> Vec<f64> {
    vec![-0.05, -0.03, 0.0, 0.03, 0.05]
}

impl Default for StressSection {
    fn default() -> Self {
        Self {
            n_paths: default_n_paths(),
            n_steps: default_n_steps(),
            percentile: default_percentile(),
            target_risk_ratio: default_target_risk_ratio(),
            seed: None,
            scenarios: default_scenarios(),
        }
    }
}

/// CLI run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Directory reports are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Stress defaults
    #[serde(default)]
    pub stress: StressSection,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            stress: StressSection::default(),
        }
    }
}

impl RunConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CliError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Loads from the given path when it exists, falling back to the
    /// defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, CliError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Applies environment overrides (`MARGIN_OUTPUT_DIR`).
    pub fn with_env_override(mut self) -> Self {
        if let Ok(dir) = std::env::var("MARGIN_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("./reports"));
        assert_eq!(config.stress.n_paths, 100_000);
        assert_eq!(config.stress.n_steps, 2);
        assert_eq!(config.stress.percentile, 90.0);
        assert_eq!(config.stress.scenarios.len(), 5);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "output_dir = \"/tmp/margin\"\n[stress]\nn_paths = 5000\nseed = 20"
        )
        .unwrap();
        let config = RunConfig::load(file.path()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/margin"));
        assert_eq!(config.stress.n_paths, 5000);
        assert_eq!(config.stress.seed, Some(20));
        // Unspecified fields keep their defaults.
        assert_eq!(config.stress.percentile, 90.0);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = RunConfig::load_or_default(Path::new("/nonexistent/margin.toml")).unwrap();
        assert_eq!(config.stress.n_paths, 100_000);
    }

    #[test]
    fn test_bad_toml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "output_dir = [not toml").unwrap();
        assert!(matches!(
            RunConfig::load(file.path()),
            Err(CliError::Config(_))
        ));
    }
}
