//! Seed types for initializing lattices.

use serde::{Deserialize, Serialize};

use crate::compute::{BernoulliSource, CellSource};

/// The classic glider, translating by (+1, +1) every 4 generations.
pub const GLIDER: [[u8; 3]; 3] = [[0, 1, 0], [0, 0, 1], [1, 1, 1]];

/// Complete seed specification for lattice initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    /// Pattern to use for seeding.
    pub pattern: Pattern,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            pattern: Pattern::Glider { origin: None },
        }
    }
}

/// Predefined patterns for initialization.
///
/// Origins are `(row, col)` of the pattern's top-left corner; every cell is
/// placed modulo the lattice size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// Independent random cells.
    Random {
        /// Probability of a cell being alive.
        density: f64,
        /// Random seed.
        seed: u64,
    },
    /// Single glider. `None` places it at `(size/2 - 1, size/2 - 1)`.
    Glider { origin: Option<(usize, usize)> },
    /// 2x2 still life.
    Block { origin: (usize, usize) },
    /// Three cells in a line, period 2.
    Blinker {
        origin: (usize, usize),
        #[serde(default)]
        vertical: bool,
    },
    /// Explicit list of alive `(row, col)` cells.
    Custom { cells: Vec<(usize, usize)> },
}

impl Seed {
    /// Generate row-major cell states for a `size x size` lattice.
    pub fn generate(&self, size: usize) -> Vec<u8> {
        let mut grid = vec![0u8; size * size];
        if size == 0 {
            return grid;
        }

        match &self.pattern {
            Pattern::Random { density, seed } => {
                // Out-of-range densities are rejected by config validation;
                // here they leave the lattice dead.
                if let Ok(mut source) = BernoulliSource::new(*seed, *density) {
                    for cell in &mut grid {
                        *cell = source.next_cell();
                    }
                }
            }
            Pattern::Glider { origin } => {
                let origin = origin.unwrap_or_else(|| centered_origin(size));
                stamp(&mut grid, size, origin, &GLIDER);
            }
            Pattern::Block { origin } => {
                stamp(&mut grid, size, *origin, &[[1, 1], [1, 1]]);
            }
            Pattern::Blinker { origin, vertical } => {
                if *vertical {
                    stamp(&mut grid, size, *origin, &[[1], [1], [1]]);
                } else {
                    stamp(&mut grid, size, *origin, &[[1, 1, 1]]);
                }
            }
            Pattern::Custom { cells } => {
                for &(row, col) in cells {
                    grid[(row % size) * size + col % size] = 1;
                }
            }
        }

        grid
    }
}

/// Top-left corner that centers a 3x3 pattern.
pub fn centered_origin(size: usize) -> (usize, usize) {
    let corner = (size / 2).saturating_sub(1);
    (corner, corner)
}

fn stamp<const W: usize>(grid: &mut [u8], size: usize, origin: (usize, usize), shape: &[[u8; W]]) {
    for (dr, row) in shape.iter().enumerate() {
        for (dc, &cell) in row.iter().enumerate() {
            if cell == 1 {
                let r = (origin.0 + dr) % size;
                let c = (origin.1 + dc) % size;
                grid[r * size + c] = 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alive(grid: &[u8], size: usize) -> Vec<(usize, usize)> {
        grid.iter()
            .enumerate()
            .filter(|&(_, &c)| c == 1)
            .map(|(i, _)| (i / size, i % size))
            .collect()
    }

    #[test]
    fn test_centered_glider() {
        let grid = Seed::default().generate(20);
        assert_eq!(
            alive(&grid, 20),
            vec![(9, 10), (10, 11), (11, 9), (11, 10), (11, 11)]
        );
    }

    #[test]
    fn test_patterns_wrap() {
        let seed = Seed {
            pattern: Pattern::Blinker {
                origin: (4, 3),
                vertical: true,
            },
        };
        assert_eq!(alive(&seed.generate(5), 5), vec![(0, 3), (1, 3), (4, 3)]);
    }

    #[test]
    fn test_random_seed_is_reproducible() {
        let seed = Seed {
            pattern: Pattern::Random {
                density: 0.5,
                seed: 42,
            },
        };
        let a = seed.generate(16);
        assert_eq!(a, seed.generate(16));
        let population: usize = a.iter().map(|&c| c as usize).sum();
        assert!(population > 0 && population < 256);
    }

    #[test]
    fn test_seed_json_roundtrip() {
        let json = r#"{"pattern":{"type":"Block","origin":[2,3]}}"#;
        let seed: Seed = serde_json::from_str(json).unwrap();
        assert_eq!(alive(&seed.generate(6), 6), vec![(2, 3), (2, 4), (3, 3), (3, 4)]);
    }
}
