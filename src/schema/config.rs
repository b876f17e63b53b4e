//! Configuration types for equilibrium and glider experiments.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Pattern, Seed};

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

/// Top-level experiment configuration read by the CLI.
///
/// Each analysis runs only when its section is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Repeated random trials until population settles.
    #[serde(default)]
    pub equilibrium: Option<EquilibriumConfig>,
    /// Glider drift measurement.
    #[serde(default)]
    pub glider: Option<GliderConfig>,
    /// Step a seeded lattice and report population every generation.
    #[serde(default)]
    pub trace: Option<TraceConfig>,
    /// Directory receiving CSV and JSON results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            equilibrium: Some(EquilibriumConfig::default()),
            glider: Some(GliderConfig::default()),
            trace: None,
            output_dir: default_output_dir(),
        }
    }
}

impl ExperimentConfig {
    /// Validate every configured section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(equilibrium) = &self.equilibrium {
            equilibrium.validate()?;
        }
        if let Some(glider) = &self.glider {
            glider.validate()?;
        }
        if let Some(trace) = &self.trace {
            trace.validate()?;
        }
        Ok(())
    }
}

/// Parameters for the equilibrium detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquilibriumConfig {
    /// Lattice side length.
    pub size: usize,
    /// Number of independent random trials.
    pub trials: usize,
    /// Length of the population and period-signal windows.
    pub window: usize,
    /// Largest period accepted as settled. Longer cycles keep the trial running.
    pub max_period: usize,
    /// Periods above this are flagged as notable oscillators.
    pub notable_period: usize,
    /// Probability of a cell being alive when reseeding.
    pub density: f64,
    /// Random seed (None = entropy).
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Optional cap on generations per trial. None waits indefinitely.
    #[serde(default)]
    pub max_steps: Option<u64>,
}

impl Default for EquilibriumConfig {
    fn default() -> Self {
        Self {
            size: 50,
            trials: 1000,
            window: 20,
            max_period: 4,
            notable_period: 2,
            density: 0.5,
            random_seed: None,
            max_steps: None,
        }
    }
}

impl EquilibriumConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::InvalidSize);
        }
        if self.trials == 0 {
            return Err(ConfigError::InvalidTrials);
        }
        if self.window < 2 {
            return Err(ConfigError::InvalidWindow(self.window));
        }
        if self.max_period == 0 {
            return Err(ConfigError::InvalidMaxPeriod);
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(ConfigError::InvalidDensity(self.density));
        }
        if self.max_steps == Some(0) {
            return Err(ConfigError::InvalidSteps);
        }
        Ok(())
    }
}

/// How per-step centroid displacements are unwrapped across the seam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisUnwrap {
    /// Correct the row and column components independently.
    #[default]
    Independent,
    /// Correct the row component, or else the column component, never both.
    Exclusive,
}

/// Parameters for the glider centroid tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GliderConfig {
    /// Lattice side length.
    pub size: usize,
    /// Number of centroids to record.
    pub steps: usize,
    /// Pattern to track.
    #[serde(default)]
    pub seed: Seed,
    #[serde(default)]
    pub unwrap: AxisUnwrap,
}

impl Default for GliderConfig {
    fn default() -> Self {
        Self {
            size: 20,
            steps: 10001,
            seed: Seed::default(),
            unwrap: AxisUnwrap::default(),
        }
    }
}

impl GliderConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::InvalidSize);
        }
        if self.steps == 0 {
            return Err(ConfigError::InvalidSteps);
        }
        validate_seed(&self.seed, self.size)
    }
}

/// Parameters for a plain population trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    pub size: usize,
    pub steps: u64,
    pub seed: Seed,
}

impl TraceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::InvalidSize);
        }
        if self.steps == 0 {
            return Err(ConfigError::InvalidSteps);
        }
        validate_seed(&self.seed, self.size)
    }
}

fn validate_seed(seed: &Seed, size: usize) -> Result<(), ConfigError> {
    let origin = match &seed.pattern {
        Pattern::Random { density, .. } => {
            if !(0.0..=1.0).contains(density) {
                return Err(ConfigError::InvalidDensity(*density));
            }
            None
        }
        Pattern::Glider { origin } => *origin,
        Pattern::Block { origin } | Pattern::Blinker { origin, .. } => Some(*origin),
        Pattern::Custom { .. } => None,
    };
    match origin {
        Some((row, col)) if row >= size || col >= size => {
            Err(ConfigError::OriginOutOfBounds { row, col, size })
        }
        _ => Ok(()),
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Lattice size must be non-zero")]
    InvalidSize,
    #[error("Trial count must be non-zero")]
    InvalidTrials,
    #[error("Window length must be at least 2, got {0}")]
    InvalidWindow(usize),
    #[error("Maximum period must be non-zero")]
    InvalidMaxPeriod,
    #[error("Density must lie in [0, 1], got {0}")]
    InvalidDensity(f64),
    #[error("Step count must be non-zero")]
    InvalidSteps,
    #[error("Pattern origin ({row}, {col}) lies outside a {size}x{size} lattice")]
    OriginOutOfBounds { row: usize, col: usize, size: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ExperimentConfig::default().validate().is_ok());
        let eq = EquilibriumConfig::default();
        assert_eq!(eq.window, 20);
        assert_eq!(eq.max_period, 4);
        assert_eq!(eq.trials, 1000);
        assert_eq!(GliderConfig::default().steps, 10001);
    }

    #[test]
    fn test_invalid_equilibrium() {
        let config = EquilibriumConfig {
            density: 1.2,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidDensity(1.2)));

        let config = EquilibriumConfig {
            window: 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidWindow(1)));
    }

    #[test]
    fn test_glider_origin_out_of_bounds() {
        let config = GliderConfig {
            size: 10,
            seed: Seed {
                pattern: Pattern::Glider {
                    origin: Some((3, 10)),
                },
            },
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::OriginOutOfBounds {
                row: 3,
                col: 10,
                size: 10
            })
        );
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{"glider": {"size": 32, "steps": 400, "unwrap": "exclusive"}}"#;
        let config: ExperimentConfig = serde_json::from_str(json).unwrap();
        assert!(config.equilibrium.is_none());
        let glider = config.glider.unwrap();
        assert_eq!(glider.size, 32);
        assert_eq!(glider.unwrap, AxisUnwrap::Exclusive);
        assert!(matches!(glider.seed.pattern, Pattern::Glider { origin: None }));
        assert_eq!(config.output_dir, PathBuf::from("results"));
    }
}
