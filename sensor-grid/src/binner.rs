//! Stage 1: assign samples to grid cells.

use tracing::{debug, span, trace, Level};

use crate::config::{GridConfig, MeasurementSchema};
use crate::error::{GridError, Result};
use crate::sample::{AnchoredSample, GridCoordinate, Sample};
use crate::storage::CellArray;

/// Running totals for one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct BinnedCell {
    /// Per-measurement sums, in schema order
    pub measurement_sums: Vec<f64>,
    pub sample_count: usize,
    /// Samples in input order, anchored at this cell's center
    pub source_samples: Vec<AnchoredSample>,
}

impl BinnedCell {
    fn empty(measurements: usize) -> Self {
        Self {
            measurement_sums: vec![0.0; measurements],
            sample_count: 0,
            source_samples: Vec::new(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.sample_count > 0
    }
}

/// Output of [`bin`].
#[derive(Clone, Debug, PartialEq)]
pub struct BinnedGrid {
    pub(crate) cells: CellArray<BinnedCell>,
    pub(crate) schema: MeasurementSchema,
    pub(crate) cell_size: f64,
    pub(crate) discarded: usize,
}

impl BinnedGrid {
    pub fn side_count(&self) -> usize {
        self.cells.side()
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&BinnedCell> {
        self.cells.get(GridCoordinate::new(row, col))
    }

    /// Number of samples that landed in some cell.
    pub fn binned_count(&self) -> usize {
        self.cells.iter().map(|(_, c)| c.sample_count).sum()
    }

    /// Number of out-of-domain samples that were dropped.
    pub fn discarded_count(&self) -> usize {
        self.discarded
    }
}

/// Bin `samples` into a fresh grid described by `config`.
///
/// Samples whose cell falls outside the grid are dropped silently. Each sample
/// must carry at least one value per schema measurement; extra trailing values
/// are ignored.
pub fn bin(samples: &[Sample], config: &GridConfig) -> Result<BinnedGrid> {
    let _span = span!(Level::TRACE, "bin").entered();

    let side_count = config.side_count()?;
    let schema = &config.schema;
    let mut cells = CellArray::from_fn(side_count, |_| BinnedCell::empty(schema.len()));
    let mut discarded = 0;

    for (index, sample) in samples.iter().enumerate() {
        if sample.measurements.len() < schema.len() {
            return Err(GridError::MissingMeasurement {
                measurement: schema.names()[sample.measurements.len()].clone(),
                index,
            });
        }

        let Some(coord) = GridCoordinate::locate(
            sample.latitude,
            sample.longitude,
            config.cell_size,
            side_count,
        ) else {
            trace!(
                "Dropping sample {} at ({}, {}): outside grid",
                index,
                sample.latitude,
                sample.longitude
            );
            discarded += 1;
            continue;
        };

        let anchor = coord.anchor(config.cell_size);
        if let Some(cell) = cells.get_mut(coord) {
            for (sum, value) in cell.measurement_sums.iter_mut().zip(&sample.measurements) {
                *sum += value;
            }
            cell.sample_count += 1;
            cell.source_samples.push(AnchoredSample {
                sample: sample.clone(),
                anchor,
            });
        }
    }

    if discarded > 0 {
        debug!("Dropped {} of {} samples outside the grid", discarded, samples.len());
    }

    Ok(BinnedGrid {
        cells,
        schema: schema.clone(),
        cell_size: config.cell_size,
        discarded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::AnchorPoint;

    fn config() -> GridConfig {
        GridConfig::new(100.0, 10.0, MeasurementSchema::new(["t", "h"]))
    }

    #[test]
    fn sums_and_counts_per_cell() {
        let samples = vec![
            Sample::new(5.0, 5.0, vec![100.0, 1.0]),
            Sample::new(7.5, 2.5, vec![200.0, 3.0]),
            Sample::new(95.0, 95.0, vec![50.0, 9.0]),
        ];
        let binned = bin(&samples, &config()).unwrap();

        let origin = binned.cell_at(0, 0).unwrap();
        assert_eq!(origin.measurement_sums, vec![300.0, 4.0]);
        assert_eq!(origin.sample_count, 2);
        assert!(origin.has_data());

        let corner = binned.cell_at(9, 9).unwrap();
        assert_eq!(corner.sample_count, 1);
        assert_eq!(corner.source_samples[0].anchor, AnchorPoint { x: 95.0, y: 95.0 });

        assert!(!binned.cell_at(4, 4).unwrap().has_data());
        assert_eq!(binned.binned_count(), 3);
    }

    #[test]
    fn keeps_input_order_within_a_cell() {
        let samples: Vec<_> = (0..5)
            .map(|i| Sample::new(1.0 + i as f64, 3.0, vec![i as f64, 0.0]))
            .collect();
        let binned = bin(&samples, &config()).unwrap();
        let order: Vec<f64> = binned.cell_at(0, 0).unwrap().source_samples
            .iter()
            .map(|s| s.sample.measurements[0])
            .collect();
        assert_eq!(order, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn drops_out_of_domain_samples() {
        let samples = vec![
            Sample::new(-1.0, 5.0, vec![1.0, 1.0]),
            Sample::new(5.0, 100.0, vec![1.0, 1.0]),
            Sample::new(50.0, 50.0, vec![1.0, 1.0]),
        ];
        let binned = bin(&samples, &config()).unwrap();
        assert_eq!(binned.binned_count(), 1);
        assert_eq!(binned.discarded_count(), 2);
    }

    #[test]
    fn rejects_samples_short_of_the_schema() {
        let samples = vec![Sample::new(5.0, 5.0, vec![1.0])];
        assert_eq!(
            bin(&samples, &config()),
            Err(GridError::MissingMeasurement {
                measurement: "h".into(),
                index: 0
            })
        );
    }

    #[test]
    fn invalid_configuration_fails_before_binning() {
        let mut config = config();
        config.cell_size = -1.0;
        assert_eq!(bin(&[], &config), Err(GridError::InvalidCellSize(-1.0)));
    }
}
