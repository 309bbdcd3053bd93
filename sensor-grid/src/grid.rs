//! The finished grid handed to consumers.

use crate::config::MeasurementSchema;
use crate::sample::{AnchoredSample, GridCoordinate};
use crate::storage::CellArray;

// --------------------------------------------------------------------------
// Cell

/// One grid entry after all three stages.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub(crate) means: Option<Vec<f64>>,
    pub(crate) sample_count: usize,
    pub(crate) has_data: bool,
    pub(crate) source_samples: Vec<AnchoredSample>,
    pub(crate) infilled_from: Option<GridCoordinate>,
}

impl Cell {
    /// Per-measurement means in schema order. Own means for populated cells,
    /// copied means for infilled ones, `None` only when the grid had no data.
    pub fn means(&self) -> Option<&[f64]> {
        self.means.as_deref()
    }

    pub fn mean(&self, schema: &MeasurementSchema, name: &str) -> Option<f64> {
        let index = schema.index_of(name)?;
        self.means().and_then(|m| m.get(index).copied())
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Whether any sample was binned here. Infilling never changes this.
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    pub fn source_samples(&self) -> &[AnchoredSample] {
        &self.source_samples
    }

    /// The populated cell whose means were copied here, if this cell was infilled.
    pub fn infilled_from(&self) -> Option<GridCoordinate> {
        self.infilled_from
    }
}

// --------------------------------------------------------------------------
// Grid

/// Immutable `side_count x side_count` snapshot of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub(crate) cells: CellArray<Cell>,
    pub(crate) schema: MeasurementSchema,
    pub(crate) cell_size: f64,
    pub(crate) discarded: usize,
}

impl Grid {
    pub fn side_count(&self) -> usize {
        self.cells.side()
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn schema(&self) -> &MeasurementSchema {
        &self.schema
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(GridCoordinate::new(row, col))
    }

    /// Mean of `measurement` at `(row, col)`.
    pub fn value_at(&self, row: usize, col: usize, measurement: &str) -> Option<f64> {
        self.cell_at(row, col)?.mean(&self.schema, measurement)
    }

    /// All cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (GridCoordinate, &Cell)> + '_ {
        self.cells.iter()
    }

    /// Every cell paired with its source samples, row-major, for point overlays.
    pub fn markers(&self) -> impl Iterator<Item = (GridCoordinate, &Cell, &[AnchoredSample])> + '_ {
        self.cells
            .iter()
            .map(|(coord, cell)| (coord, cell, cell.source_samples()))
    }

    /// Number of in-domain samples across all cells.
    pub fn sample_count(&self) -> usize {
        self.cells.iter().map(|(_, c)| c.sample_count).sum()
    }

    /// Number of samples dropped for falling outside the grid.
    pub fn discarded_count(&self) -> usize {
        self.discarded
    }

    pub fn populated_count(&self) -> usize {
        self.cells.iter().filter(|(_, c)| c.has_data).count()
    }

    pub fn infilled_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|(_, c)| c.infilled_from.is_some())
            .count()
    }

    /// True when no cell has any means (no in-domain samples at all).
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|(_, c)| c.means.is_none())
    }

    /// Smallest and largest cell mean of `measurement`.
    pub fn mean_bounds(&self, measurement: &str) -> Option<(f64, f64)> {
        let index = self.schema.index_of(measurement)?;
        self.cells
            .iter()
            .filter_map(|(_, c)| c.means().and_then(|m| m.get(index).copied()))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
