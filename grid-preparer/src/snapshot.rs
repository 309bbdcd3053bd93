//! Binary export of one measurement layer of a grid.
//!
//! Layout, all little-endian:
//!
//! ```text
//! side_count: u32
//! cell_size:  f64
//! means:      side_count² x f64, row-major (NaN where a cell has no value)
//! has_data:   side_count² x u8 (0 or 1)
//! ```

use std::io::{Read, Write};
use std::path::Path;

use sensor_grid::{Grid, MAX_SIDE_COUNT};

/// A measurement layer read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub side_count: usize,
    pub cell_size: f64,
    pub means: Vec<f64>,
    pub has_data: Vec<bool>,
}

impl GridSnapshot {
    pub fn from_grid(grid: &Grid, measurement: &str) -> std::io::Result<Self> {
        let index = grid.schema().index_of(measurement).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Unknown measurement: {}", measurement),
            )
        })?;
        let (means, has_data) = grid
            .cells()
            .map(|(_, cell)| {
                let mean = cell.means().map_or(f64::NAN, |m| m[index]);
                (mean, cell.has_data())
            })
            .unzip();
        Ok(Self {
            side_count: grid.side_count(),
            cell_size: grid.cell_size(),
            means,
            has_data,
        })
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.side_count && col < self.side_count {
            Some(self.means[row * self.side_count + col])
        } else {
            None
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        // Anything written here must be readable by `read_from`.
        let cell_count = self.side_count * self.side_count;
        if self.side_count > MAX_SIDE_COUNT
            || self.means.len() != cell_count
            || self.has_data.len() != cell_count
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "Cannot write {0}x{0} snapshot with {1} means and {2} flags (side limit {3})",
                    self.side_count,
                    self.means.len(),
                    self.has_data.len(),
                    MAX_SIDE_COUNT
                ),
            ));
        }
        writer.write_all(&(self.side_count as u32).to_le_bytes())?;
        writer.write_all(&self.cell_size.to_le_bytes())?;
        for mean in &self.means {
            writer.write_all(&mean.to_le_bytes())?;
        }
        for &flag in &self.has_data {
            writer.write_all(&[flag as u8])?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut side_bytes = [0u8; 4];
        let mut cell_size_bytes = [0u8; 8];
        reader.read_exact(&mut side_bytes)?;
        reader.read_exact(&mut cell_size_bytes)?;

        let side_count = u32::from_le_bytes(side_bytes) as usize;
        if side_count > MAX_SIDE_COUNT {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Side count {} exceeds limit {}", side_count, MAX_SIDE_COUNT),
            ));
        }
        let cell_size = f64::from_le_bytes(cell_size_bytes);
        let cell_count = side_count * side_count;

        let mut means = vec![0f64; cell_count];
        for value in means.iter_mut() {
            let mut bytes = [0u8; 8];
            reader.read_exact(&mut bytes)?;
            *value = f64::from_le_bytes(bytes);
        }

        let mut flags = vec![0u8; cell_count];
        reader.read_exact(&mut flags)?;
        let has_data = flags
            .into_iter()
            .map(|flag| match flag {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Invalid has_data flag: {}", other),
                )),
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        Ok(Self {
            side_count,
            cell_size,
            means,
            has_data,
        })
    }
}

pub fn write_snapshot(grid: &Grid, measurement: &str, path: &Path) -> std::io::Result<()> {
    let snapshot = GridSnapshot::from_grid(grid, measurement)?;
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    snapshot.write_to(&mut file)?;
    file.flush()
}

pub fn read_snapshot(path: &Path) -> std::io::Result<GridSnapshot> {
    let mut file = std::io::BufReader::new(std::fs::File::open(path)?);
    GridSnapshot::read_from(&mut file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_grid::{build_grid, GridConfig, Sample};
    use std::io::Cursor;

    fn grid() -> Grid {
        let samples = vec![
            Sample::new(5.0, 5.0, vec![100.0, 20.0, 30.0]),
            Sample::new(75.0, 35.0, vec![180.0, 40.0, 60.0]),
        ];
        build_grid(&samples, &GridConfig::default()).unwrap()
    }

    #[test]
    fn file_round_trip_keeps_layer() {
        let grid = grid();
        let file = tempfile::NamedTempFile::new().unwrap();
        write_snapshot(&grid, "humidity", file.path()).unwrap();

        let snapshot = read_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.side_count, 10);
        assert_eq!(snapshot.cell_size, 10.0);
        assert_eq!(snapshot.value_at(0, 0), Some(20.0));
        assert_eq!(snapshot.value_at(7, 3), Some(40.0));
        assert_eq!(snapshot.value_at(10, 0), None);
        assert_eq!(snapshot.has_data.iter().filter(|&&f| f).count(), 2);
        assert_eq!(snapshot, GridSnapshot::from_grid(&grid, "humidity").unwrap());
    }

    #[test]
    fn unknown_measurement_is_rejected() {
        let err = GridSnapshot::from_grid(&grid(), "pressure").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn truncated_input_fails() {
        let mut bytes = Vec::new();
        GridSnapshot::from_grid(&grid(), "co2").unwrap().write_to(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 1);
        let err = GridSnapshot::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn writer_refuses_what_the_reader_would_reject() {
        let side_count = MAX_SIDE_COUNT + 1;
        let oversized = GridSnapshot {
            side_count,
            cell_size: 1.0,
            means: Vec::new(),
            has_data: Vec::new(),
        };
        let mut bytes = Vec::new();
        let err = oversized.write_to(&mut bytes).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(bytes.is_empty());

        let mismatched = GridSnapshot {
            side_count: 2,
            cell_size: 1.0,
            means: vec![0.0; 3],
            has_data: vec![false; 4],
        };
        assert!(mismatched.write_to(&mut bytes).is_err());
    }

    #[test]
    fn oversized_header_is_rejected() {
        let mut bytes = u32::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&1.0f64.to_le_bytes());
        let err = GridSnapshot::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
