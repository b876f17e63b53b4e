//! Result export for equilibrium and drift runs.
//!
//! All output is plain comma-separated text:
//!
//! ```text
//! equilibrium_times.csv    one settling time per line
//! equilibrium_active.csv   one settled population per line
//! oscillator_<sig>.csv     size x size matrix of 0/1, one row per line
//! glider_centroids.csv     row,col per generation
//! glider_displacements.csv row,col per consecutive pair
//! ```

mod archive;
mod csv;

pub use archive::{ArchivedOscillator, OscillatorArchive, signature_key};
pub use csv::{
    save_centroids, save_column, save_displacements, save_lattice, save_summary, write_column,
    write_lattice, write_pairs,
};
