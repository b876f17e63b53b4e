//! Schema module - Configuration and seeding types for lattice experiments.

mod config;
mod seed;

pub use config::*;
pub use seed::*;
