//! Compute module - Lattice, step rule and the two analyses built on it.

mod centroid;
mod equilibrium;
mod lattice;
mod random;
mod step;

pub use centroid::*;
pub use equilibrium::*;
pub use lattice::*;
pub use random::*;
pub use step::*;
