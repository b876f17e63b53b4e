//! Step engine - advances a lattice by one Game of Life generation.
//!
//! All neighbor counts are taken from a single snapshot of the lattice before
//! any cell is rewritten, so the update is simultaneous for every cell.

use super::Lattice;

/// Next state of a single cell under the B3/S23 rule.
///
/// - alive with fewer than 2 or more than 3 neighbors: dies
/// - dead with exactly 3 neighbors: born
/// - otherwise: unchanged
#[inline]
pub fn next_state(alive: u8, neighbors: u8) -> u8 {
    match (alive, neighbors) {
        (1, n) if !(2..=3).contains(&n) => 0,
        (0, 3) => 1,
        (state, _) => state,
    }
}

/// Count the eight toroidal neighbors of every cell into `counts`.
///
/// `cells` is row-major with side `size`; `counts` must have the same length.
pub fn neighbor_counts_into(cells: &[u8], size: usize, counts: &mut [u8]) {
    debug_assert_eq!(cells.len(), size * size);
    debug_assert_eq!(counts.len(), cells.len());

    for row in 0..size {
        let up = (row + size - 1) % size * size;
        let mid = row * size;
        let down = (row + 1) % size * size;

        for col in 0..size {
            let left = (col + size - 1) % size;
            let right = (col + 1) % size;

            counts[mid + col] = cells[up + left]
                + cells[up + col]
                + cells[up + right]
                + cells[mid + left]
                + cells[mid + right]
                + cells[down + left]
                + cells[down + col]
                + cells[down + right];
        }
    }
}

/// Advance `lattice` by one generation.
///
/// Allocates scratch buffers on every call; use [`StepEngine`] when stepping
/// the same lattice repeatedly.
pub fn step(lattice: &mut Lattice) {
    StepEngine::new(lattice.size()).step(lattice);
}

/// Game of Life stepper with pre-allocated scratch buffers.
///
/// The engine holds no simulation state of its own: the output of
/// [`StepEngine::step`] depends only on the lattice passed in.
pub struct StepEngine {
    size: usize,
    /// Neighbor counts from the pre-step snapshot.
    counts: Vec<u8>,
    /// Pre-allocated buffer for the next generation (reused each step).
    next: Vec<u8>,
}

impl StepEngine {
    /// Create an engine sized for `size x size` lattices.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            counts: vec![0; size * size],
            next: vec![0; size * size],
        }
    }

    fn resize(&mut self, size: usize) {
        if self.size != size {
            self.size = size;
            self.counts = vec![0; size * size];
            self.next = vec![0; size * size];
        }
    }

    /// Perform one generation in place.
    pub fn step(&mut self, lattice: &mut Lattice) {
        self.resize(lattice.size());

        neighbor_counts_into(lattice.cells(), self.size, &mut self.counts);

        for ((next, &cell), &n) in self
            .next
            .iter_mut()
            .zip(lattice.cells().iter())
            .zip(self.counts.iter())
        {
            *next = next_state(cell, n);
        }

        // Swap buffers (no allocation, just pointer swap)
        lattice.swap_generation(&mut self.next);
    }

    /// Run for the specified number of generations.
    pub fn run(&mut self, lattice: &mut Lattice, steps: u64) {
        for _ in 0..steps {
            self.step(lattice);
        }
    }

    /// Run for `steps` generations, invoking `callback` after each one.
    ///
    /// This is the hook for external drivers such as renderers.
    pub fn run_with_callback<F>(&mut self, lattice: &mut Lattice, steps: u64, mut callback: F)
    where
        F: FnMut(&Lattice),
    {
        for _ in 0..steps {
            self.step(lattice);
            callback(lattice);
        }
    }
}
