//! Archive of notable oscillators found during equilibrium runs.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::csv::save_lattice;
use crate::compute::{Lattice, NotableOscillator};

/// Archive keyed by population signature.
///
/// Oscillators sharing a signature overwrite each other, so the archive holds
/// the most recent lattice for each distinct cycle.
#[derive(Debug, Default)]
pub struct OscillatorArchive {
    oscillators: BTreeMap<String, ArchivedOscillator>,
    /// Output directory for saving lattices.
    output_dir: Option<PathBuf>,
}

/// An archived oscillator.
#[derive(Debug, Clone)]
pub struct ArchivedOscillator {
    pub trial: usize,
    pub signature: Vec<usize>,
    pub lattice: Lattice,
    /// File path if saved.
    pub saved_path: Option<PathBuf>,
}

/// File-name-safe key for a population signature, e.g. `12_13_15`.
pub fn signature_key(signature: &[usize]) -> String {
    signature
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join("_")
}

impl OscillatorArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output directory for saving lattices.
    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> io::Result<Self> {
        let path = dir.as_ref().to_path_buf();
        fs::create_dir_all(&path)?;
        self.output_dir = Some(path);
        Ok(self)
    }

    /// Add an oscillator. Returns true if its signature was not yet present.
    pub fn add(&mut self, oscillator: &NotableOscillator) -> bool {
        let key = signature_key(&oscillator.signature);
        self.oscillators
            .insert(
                key,
                ArchivedOscillator {
                    trial: oscillator.trial,
                    signature: oscillator.signature.clone(),
                    lattice: oscillator.lattice.clone(),
                    saved_path: None,
                },
            )
            .is_none()
    }

    /// Get an oscillator by signature.
    pub fn get(&self, signature: &[usize]) -> Option<&ArchivedOscillator> {
        self.oscillators.get(&signature_key(signature))
    }

    /// All oscillators ordered by signature key.
    pub fn all(&self) -> impl Iterator<Item = &ArchivedOscillator> {
        self.oscillators.values()
    }

    pub fn len(&self) -> usize {
        self.oscillators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oscillators.is_empty()
    }

    /// Save one oscillator lattice as `oscillator_<key>.csv`.
    pub fn save(&mut self, signature: &[usize]) -> io::Result<PathBuf> {
        let output_dir = self
            .output_dir
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No output directory set"))?;

        let key = signature_key(signature);
        let oscillator = self
            .oscillators
            .get_mut(&key)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Oscillator not found"))?;

        let path = output_dir.join(format!("oscillator_{}.csv", key));
        save_lattice(&path, &oscillator.lattice)?;

        oscillator.saved_path = Some(path.clone());
        Ok(path)
    }

    /// Save every oscillator.
    pub fn save_all(&mut self) -> io::Result<Vec<PathBuf>> {
        let signatures: Vec<Vec<usize>> = self.all().map(|o| o.signature.clone()).collect();
        signatures.iter().map(|s| self.save(s)).collect()
    }
}
