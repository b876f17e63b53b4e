//! Comma-separated writers for numeric result arrays.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::compute::{Centroid, Displacement, Lattice};

/// Write one value per line.
pub fn write_column<W: Write, T: Display>(w: &mut W, values: &[T]) -> io::Result<()> {
    for v in values {
        writeln!(w, "{}", v)?;
    }
    Ok(())
}

/// Write two comma-separated values per line.
pub fn write_pairs<W: Write>(
    w: &mut W,
    pairs: impl IntoIterator<Item = (f64, f64)>,
) -> io::Result<()> {
    for (a, b) in pairs {
        writeln!(w, "{},{}", a, b)?;
    }
    Ok(())
}

/// Write the lattice as a matrix, one row per line.
pub fn write_lattice<W: Write>(w: &mut W, lattice: &Lattice) -> io::Result<()> {
    for row in lattice.rows() {
        let line: Vec<String> = row.iter().map(u8::to_string).collect();
        writeln!(w, "{}", line.join(","))?;
    }
    Ok(())
}

fn create<P: AsRef<Path>>(path: P) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Save one value per line to `path`.
pub fn save_column<P: AsRef<Path>, T: Display>(path: P, values: &[T]) -> io::Result<()> {
    let mut w = create(path)?;
    write_column(&mut w, values)?;
    w.flush()
}

/// Save a lattice matrix to `path`.
pub fn save_lattice<P: AsRef<Path>>(path: P, lattice: &Lattice) -> io::Result<()> {
    let mut w = create(path)?;
    write_lattice(&mut w, lattice)?;
    w.flush()
}

/// Save a centroid sequence as `row,col` lines.
pub fn save_centroids<P: AsRef<Path>>(path: P, centroids: &[Centroid]) -> io::Result<()> {
    let mut w = create(path)?;
    write_pairs(&mut w, centroids.iter().map(|c| (c.row, c.col)))?;
    w.flush()
}

/// Save displacements as `row,col` lines.
pub fn save_displacements<P: AsRef<Path>>(
    path: P,
    displacements: &[Displacement],
) -> io::Result<()> {
    let mut w = create(path)?;
    write_pairs(&mut w, displacements.iter().map(|d| (d.row, d.col)))?;
    w.flush()
}

/// Save any serializable summary as pretty JSON.
pub fn save_summary<P: AsRef<Path>, T: Serialize>(path: P, summary: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_column() {
        let mut buf = Vec::new();
        write_column(&mut buf, &[19u64, 42, 7]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "19\n42\n7\n");
    }

    #[test]
    fn test_write_lattice() {
        let lattice = Lattice::from_rows(3, &[[0u8, 1, 0], [0, 0, 1], [1, 1, 1]]).unwrap();
        let mut buf = Vec::new();
        write_lattice(&mut buf, &lattice).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0,1,0\n0,0,1\n1,1,1\n");
    }

    #[test]
    fn test_save_centroids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("centroids.csv");
        let centroids = [
            Centroid { row: 1.5, col: 2.0 },
            Centroid {
                row: 1.75,
                col: 2.25,
            },
        ];
        save_centroids(&path, &centroids).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1.5,2\n1.75,2.25\n"
        );
    }

    #[test]
    fn test_save_summary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let velocity = Displacement {
            row: 0.25,
            col: 0.25,
        };
        save_summary(&path, &velocity).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["row"], 0.25);
    }
}
