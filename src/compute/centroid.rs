//! Center-of-mass tracking for a single translating pattern.
//!
//! The centroid of the alive cells is computed every generation, unwrapped
//! across the periodic seams, and consecutive centroids are differenced into
//! per-step displacements whose mean is the drift velocity.

use log::{debug, info};
use serde::Serialize;

use super::{Lattice, StepEngine};
use crate::schema::{AxisUnwrap, ConfigError, GliderConfig};

/// Errors raised while tracking a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CentroidError {
    #[error("No alive cells at generation {generation}; a centroid needs at least one")]
    EmptyPattern { generation: u64 },
}

/// Mean position of the alive cells, in `[0, size)` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Centroid {
    pub row: f64,
    pub col: f64,
}

/// Per-step change in centroid position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Displacement {
    pub row: f64,
    pub col: f64,
}

impl Displacement {
    /// Euclidean norm.
    pub fn magnitude(&self) -> f64 {
        self.row.hypot(self.col)
    }
}

/// Compute the centroid of all alive cells.
///
/// When the alive cells span the full extent of an axis the pattern is taken
/// to straddle that seam, and coordinates past the midpoint are shifted back
/// by `size` before averaging.
pub fn centroid(lattice: &Lattice) -> Result<Centroid, CentroidError> {
    let coords = lattice.alive_coordinates();
    let Some(&(first_row, first_col)) = coords.first() else {
        return Err(CentroidError::EmptyPattern {
            generation: lattice.generation(),
        });
    };

    let size = lattice.size();
    let half = size / 2;

    let (mut min_row, mut max_row) = (first_row, first_row);
    let (mut min_col, mut max_col) = (first_col, first_col);
    for &(r, c) in &coords {
        min_row = min_row.min(r);
        max_row = max_row.max(r);
        min_col = min_col.min(c);
        max_col = max_col.max(c);
    }

    let wrap_rows = max_row - min_row == size - 1;
    let wrap_cols = max_col - min_col == size - 1;

    let shift = |x: usize, wraps: bool| -> f64 {
        if wraps && x > half {
            x as f64 - size as f64
        } else {
            x as f64
        }
    };

    let n = coords.len() as f64;
    let mut row = coords.iter().map(|&(r, _)| shift(r, wrap_rows)).sum::<f64>() / n;
    let mut col = coords.iter().map(|&(_, c)| shift(c, wrap_cols)).sum::<f64>() / n;

    if row < 0.0 {
        row += size as f64;
    }
    if col < 0.0 {
        col += size as f64;
    }

    Ok(Centroid { row, col })
}

/// Bring one displacement component into `[-size/2, size/2]`.
#[inline]
fn unwrap_component(delta: f64, size: usize) -> Option<f64> {
    let half = (size / 2) as f64;
    if delta.abs() > half {
        Some(if delta > 0.0 {
            delta - size as f64
        } else {
            delta + size as f64
        })
    } else {
        None
    }
}

/// Displacement between two consecutive centroids on a `size` torus.
pub fn displacement(from: Centroid, to: Centroid, size: usize, mode: AxisUnwrap) -> Displacement {
    let mut d = Displacement {
        row: to.row - from.row,
        col: to.col - from.col,
    };

    match mode {
        AxisUnwrap::Independent => {
            if let Some(row) = unwrap_component(d.row, size) {
                d.row = row;
            }
            if let Some(col) = unwrap_component(d.col, size) {
                d.col = col;
            }
        }
        AxisUnwrap::Exclusive => {
            if let Some(row) = unwrap_component(d.row, size) {
                d.row = row;
            } else if let Some(col) = unwrap_component(d.col, size) {
                d.col = col;
            }
        }
    }

    d
}

/// Result of tracking a pattern.
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    pub size: usize,
    /// Centroid before each generation, starting with the seeded state.
    pub centroids: Vec<Centroid>,
    /// Unwrapped difference of each consecutive centroid pair.
    pub displacements: Vec<Displacement>,
    /// Mean displacement per generation.
    pub velocity: Displacement,
    /// Norm of `velocity`. On a discrete lattice this is not the pattern's
    /// speed in the continuous sense.
    pub speed: f64,
}

/// Compact summary of a [`DriftReport`] for export.
#[derive(Debug, Clone, Serialize)]
pub struct DriftSummary {
    pub size: usize,
    pub steps: usize,
    pub velocity: Displacement,
    pub speed: f64,
}

impl DriftReport {
    pub fn summary(&self) -> DriftSummary {
        DriftSummary {
            size: self.size,
            steps: self.centroids.len(),
            velocity: self.velocity,
            speed: self.speed,
        }
    }
}

/// Tracks the centroid of a single seeded pattern.
pub struct CentroidTracker {
    lattice: Lattice,
    engine: StepEngine,
    unwrap: AxisUnwrap,
}

impl CentroidTracker {
    /// Track `lattice` using the given displacement unwrap mode.
    pub fn new(lattice: Lattice, unwrap: AxisUnwrap) -> Self {
        let engine = StepEngine::new(lattice.size());
        Self {
            lattice,
            engine,
            unwrap,
        }
    }

    /// Build the tracker from configuration.
    pub fn from_config(config: &GliderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            Lattice::from_seed(&config.seed, config.size),
            config.unwrap,
        ))
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Record `steps` centroids, stepping the lattice after each one.
    pub fn track(&mut self, steps: usize) -> Result<DriftReport, CentroidError> {
        let size = self.lattice.size();
        let mut centroids = Vec::with_capacity(steps);

        for _ in 0..steps {
            centroids.push(centroid(&self.lattice)?);
            self.engine.step(&mut self.lattice);
        }

        let displacements: Vec<Displacement> = centroids
            .windows(2)
            .map(|pair| displacement(pair[0], pair[1], size, self.unwrap))
            .collect();

        let velocity = if displacements.is_empty() {
            Displacement::default()
        } else {
            let n = displacements.len() as f64;
            Displacement {
                row: displacements.iter().map(|d| d.row).sum::<f64>() / n,
                col: displacements.iter().map(|d| d.col).sum::<f64>() / n,
            }
        };
        let speed = velocity.magnitude();

        debug!("tracked {} centroids on a {}x{} lattice", centroids.len(), size, size);
        info!(
            "velocity ({:.4}, {:.4}), magnitude {:.4}",
            velocity.row, velocity.col, speed
        );

        Ok(DriftReport {
            size,
            centroids,
            displacements,
            velocity,
            speed,
        })
    }
}
