//! Conway's Game of Life on a torus, with two analyses on top of the raw
//! simulation.
//!
//! - **Equilibrium detection**: random lattices are stepped until their
//!   population settles to a fixed point or a short cycle, recording how
//!   long that takes and the settled population.
//! - **Drift measurement**: the centroid of a single pattern (a glider) is
//!   tracked across the periodic seams to estimate its velocity.
//!
//! # Architecture
//!
//! - `schema`: Configuration types and seed patterns
//! - `compute`: Lattice, step rule, equilibrium detector, centroid tracker
//! - `export`: CSV/JSON writers and the notable-oscillator archive
//!
//! # Example
//!
//! ```rust,no_run
//! use conway_torus::{
//!     compute::{CentroidTracker, Lattice},
//!     schema::{AxisUnwrap, Seed},
//! };
//!
//! // Centered glider on a 20x20 torus
//! let lattice = Lattice::from_seed(&Seed::default(), 20);
//!
//! let mut tracker = CentroidTracker::new(lattice, AxisUnwrap::Independent);
//! let report = tracker.track(400).expect("glider never dies");
//!
//! println!("Velocity: ({:.3}, {:.3})", report.velocity.row, report.velocity.col);
//! ```

pub mod compute;
pub mod export;
pub mod schema;

// Re-export commonly used types
pub use compute::{
    CentroidTracker, DriftReport, EquilibriumDetector, EquilibriumReport, Lattice, StepEngine,
};
pub use schema::{EquilibriumConfig, ExperimentConfig, GliderConfig, Pattern, Seed};
