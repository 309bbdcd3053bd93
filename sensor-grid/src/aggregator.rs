//! Stage 2: reduce each populated cell to per-measurement means.

use tracing::{span, trace, Level};

use crate::binner::BinnedGrid;
use crate::config::MeasurementSchema;
use crate::sample::{AnchoredSample, GridCoordinate};
use crate::storage::CellArray;

/// A cell after averaging. `means` is `None` for cells nothing was binned into.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedCell {
    pub means: Option<Vec<f64>>,
    pub sample_count: usize,
    /// Fixed from the sample count at binning time
    pub has_data: bool,
    pub source_samples: Vec<AnchoredSample>,
}

/// Output of [`aggregate`].
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedGrid {
    pub(crate) cells: CellArray<AggregatedCell>,
    pub(crate) schema: MeasurementSchema,
    pub(crate) cell_size: f64,
    pub(crate) discarded: usize,
}

impl AggregatedGrid {
    pub fn side_count(&self) -> usize {
        self.cells.side()
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&AggregatedCell> {
        self.cells.get(GridCoordinate::new(row, col))
    }

    /// Number of cells holding at least one sample.
    pub fn populated_count(&self) -> usize {
        self.cells.iter().filter(|(_, c)| c.has_data).count()
    }
}

/// Turn every populated cell's sums into means.
pub fn aggregate(binned: BinnedGrid) -> AggregatedGrid {
    let _span = span!(Level::TRACE, "aggregate").entered();

    let cells = binned.cells.map(|coord, cell| {
        let has_data = cell.has_data();
        let means = has_data.then(|| {
            let count = cell.sample_count as f64;
            cell.measurement_sums.iter().map(|sum| sum / count).collect::<Vec<_>>()
        });
        if let Some(means) = &means {
            trace!("Cell {} averaged over {} samples: {:?}", coord, cell.sample_count, means);
        }
        AggregatedCell {
            means,
            sample_count: cell.sample_count,
            has_data,
            source_samples: cell.source_samples,
        }
    });

    AggregatedGrid {
        cells,
        schema: binned.schema,
        cell_size: binned.cell_size,
        discarded: binned.discarded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binner::bin;
    use crate::config::GridConfig;
    use crate::sample::Sample;

    fn config() -> GridConfig {
        GridConfig::new(100.0, 10.0, MeasurementSchema::new(["t", "h"]))
    }

    #[test]
    fn averages_populated_cells() {
        let samples = vec![
            Sample::new(5.0, 5.0, vec![100.0, 10.0]),
            Sample::new(5.0, 5.0, vec![200.0, 20.0]),
            Sample::new(6.0, 1.0, vec![300.0, 60.0]),
        ];
        let grid = aggregate(bin(&samples, &config()).unwrap());
        let cell = grid.cell_at(0, 0).unwrap();
        assert_eq!(cell.means, Some(vec![200.0, 30.0]));
        assert_eq!(cell.sample_count, 3);
        assert_eq!(cell.source_samples.len(), 3);
    }

    #[test]
    fn leaves_empty_cells_without_means() {
        let samples = vec![Sample::new(5.0, 5.0, vec![1.0, 2.0])];
        let grid = aggregate(bin(&samples, &config()).unwrap());
        let empty = grid.cell_at(3, 7).unwrap();
        assert_eq!(empty.means, None);
        assert!(!empty.has_data);
        assert_eq!(grid.populated_count(), 1);
    }
}
