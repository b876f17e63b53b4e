//! Toroidal lattice of binary cell states.
//!
//! Cells are stored as a flat row-major array: `cells[row * size + col]`.
//! Every coordinate passed to the public accessors is reduced modulo `size`,
//! so moving off one edge re-enters from the opposite edge.

use std::fmt;

use serde::Serialize;

use super::CellSource;
use crate::schema::Seed;

/// Errors raised while building or mutating a lattice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LatticeError {
    #[error("Lattice given does not match the size: expected {expected}x{expected}, got {rows}x{cols}")]
    ShapeMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Cell ({row}, {col}) must be 0 or 1, got {value}")]
    InvalidState { row: usize, col: usize, value: u8 },
}

/// Square grid of alive (1) and dead (0) cells with periodic boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lattice {
    size: usize,
    cells: Vec<u8>,
    /// Number of generations applied since the last (re-)seed.
    generation: u64,
}

impl Lattice {
    /// Create an all-dead lattice.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn empty(size: usize) -> Self {
        assert!(size > 0, "lattice size must be positive");
        Self {
            size,
            cells: vec![0; size * size],
            generation: 0,
        }
    }

    /// Create a lattice from caller-supplied rows.
    ///
    /// Fails with [`LatticeError::ShapeMismatch`] unless `rows` is exactly
    /// `size x size`, and with [`LatticeError::InvalidState`] if any entry is
    /// not 0 or 1. No lattice is constructed on failure.
    pub fn from_rows<R: AsRef<[u8]>>(size: usize, rows: &[R]) -> Result<Self, LatticeError> {
        let mismatch = |cols: usize| LatticeError::ShapeMismatch {
            expected: size,
            rows: rows.len(),
            cols,
        };

        if size == 0 || rows.len() != size {
            let cols = rows.first().map_or(0, |r| r.as_ref().len());
            return Err(mismatch(cols));
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != size {
                return Err(mismatch(values.len()));
            }
            for (col, &value) in values.iter().enumerate() {
                if value > 1 {
                    return Err(LatticeError::InvalidState { row, col, value });
                }
                cells.push(value);
            }
        }

        Ok(Self {
            size,
            cells,
            generation: 0,
        })
    }

    /// Create a lattice whose cells are drawn from `source`, row by row.
    pub fn random<S: CellSource + ?Sized>(size: usize, source: &mut S) -> Self {
        let mut lattice = Self::empty(size);
        lattice.reseed(source);
        lattice
    }

    /// Create a lattice from a seed specification.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn from_seed(seed: &Seed, size: usize) -> Self {
        assert!(size > 0, "lattice size must be positive");
        Self {
            size,
            cells: seed.generate(size),
            generation: 0,
        }
    }

    /// Overwrite every cell with fresh samples from `source` and reset the
    /// generation counter.
    pub fn reseed<S: CellSource + ?Sized>(&mut self, source: &mut S) {
        for cell in &mut self.cells {
            let value = source.next_cell();
            debug_assert!(value <= 1, "cell source produced {value}");
            *cell = value & 1;
        }
        self.generation = 0;
    }

    /// Side length of the lattice.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Generations applied since construction or the last reseed.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Row-major cell states.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks_exact(self.size)
    }

    /// Reduce a signed coordinate onto the torus.
    #[inline]
    pub fn wrap(&self, coord: isize) -> usize {
        coord.rem_euclid(self.size as isize) as usize
    }

    #[inline]
    fn idx(&self, row: isize, col: isize) -> usize {
        self.wrap(row) * self.size + self.wrap(col)
    }

    /// Cell state at `(row, col)`, taken modulo `size`.
    #[inline]
    pub fn get(&self, row: isize, col: isize) -> u8 {
        self.cells[self.idx(row, col)]
    }

    /// Set the cell at `(row, col)`, taken modulo `size`.
    pub fn set(&mut self, row: isize, col: isize, value: u8) -> Result<(), LatticeError> {
        if value > 1 {
            return Err(LatticeError::InvalidState {
                row: self.wrap(row),
                col: self.wrap(col),
                value,
            });
        }
        let idx = self.idx(row, col);
        self.cells[idx] = value;
        Ok(())
    }

    /// Number of alive cells.
    pub fn population(&self) -> usize {
        self.cells.iter().map(|&c| c as usize).sum()
    }

    /// Coordinates of every alive cell in row-major order.
    pub fn alive_coordinates(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == 1)
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }

    /// Replace all cells with `next` and advance the generation counter.
    ///
    /// `next` must come from a buffer of the same size; the old cells are
    /// handed back through it so the caller can reuse the allocation.
    pub(crate) fn swap_generation(&mut self, next: &mut Vec<u8>) {
        debug_assert_eq!(next.len(), self.cells.len());
        std::mem::swap(&mut self.cells, next);
        self.generation += 1;
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &cell in row {
                f.write_str(if cell == 1 { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
