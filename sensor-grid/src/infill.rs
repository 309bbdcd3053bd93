//! Stage 3: give empty cells the means of their nearest populated cell.
//!
//! The search grows a square box around the empty cell one radius at a time
//! and re-scans the whole box at each radius. The first radius whose box holds
//! any populated cell ends the search, and within that box the smallest
//! grid-index distance wins, earliest in row-major scan order on ties. A cell
//! in a box corner can therefore beat a slightly closer cell just outside the
//! box.
//!
//! Worst case is `O(side^4)` per empty cell on very sparse grids, which is
//! fine for grids of a few dozen cells per side.

use tracing::{debug, span, trace, Level};

use crate::aggregator::{AggregatedCell, AggregatedGrid};
use crate::grid::{Cell, Grid};
use crate::sample::GridCoordinate;
use crate::storage::CellArray;

/// Fill every empty cell from its nearest populated neighbour.
///
/// If the grid has no populated cell at all, every cell keeps `None` means;
/// [`crate::build_grid`] reports that as [`crate::GridError::EmptyDataset`].
pub fn infill(aggregated: AggregatedGrid) -> Grid {
    let _span = span!(Level::TRACE, "infill").entered();

    let sources = &aggregated.cells;
    let fills = CellArray::from_fn(sources.side(), |coord| {
        let cell = sources.get(coord)?;
        if cell.has_data {
            return None;
        }
        let nearest = nearest_populated(sources, coord)?;
        let means = sources.get(nearest)?.means.clone()?;
        trace!("Cell {} takes values of {}", coord, nearest);
        Some((nearest, means))
    });

    let empty = aggregated.cells.iter().filter(|(_, c)| !c.has_data).count();
    let mut filled = 0;
    let cells = aggregated.cells.map(|coord, cell: AggregatedCell| {
        let fill = fills.get(coord).cloned().flatten();
        let infilled_from = fill.as_ref().map(|(from, _)| *from);
        let means = match fill {
            Some((_, means)) => {
                filled += 1;
                Some(means)
            }
            None => cell.means,
        };
        Cell {
            means,
            sample_count: cell.sample_count,
            has_data: cell.has_data,
            source_samples: cell.source_samples,
            infilled_from,
        }
    });
    debug!("Infilled {} of {} empty cells", filled, empty);

    Grid {
        cells,
        schema: aggregated.schema,
        cell_size: aggregated.cell_size,
        discarded: aggregated.discarded,
    }
}

/// Nearest populated cell to `origin`, by the expanding-box search described
/// in the module docs.
pub fn nearest_populated(
    cells: &CellArray<AggregatedCell>,
    origin: GridCoordinate,
) -> Option<GridCoordinate> {
    for radius in 1..cells.side() {
        let r = radius as isize;
        // (squared distance, coordinate); squared integers order exactly like sqrt
        let mut best: Option<(isize, GridCoordinate)> = None;
        for dy in -r..=r {
            for dx in -r..=r {
                let Some((target, cell)) = cells.offset(origin, dy, dx) else {
                    continue;
                };
                if !cell.has_data {
                    continue;
                }
                let distance = dx * dx + dy * dy;
                if best.map_or(true, |(d, _)| distance < d) {
                    best = Some((distance, target));
                }
            }
        }
        if let Some((_, target)) = best {
            return Some(target);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use crate::binner::bin;
    use crate::config::{GridConfig, MeasurementSchema};
    use crate::sample::Sample;

    /// One sample per listed cell, valued `row * 100 + col`.
    fn grid_with(side: usize, populated: &[(usize, usize)]) -> AggregatedGrid {
        let config = GridConfig::new(side as f64, 1.0, MeasurementSchema::new(["v"]));
        let samples: Vec<_> = populated
            .iter()
            .map(|&(row, col)| {
                Sample::new(row as f64 + 0.5, col as f64 + 0.5, vec![(row * 100 + col) as f64])
            })
            .collect();
        aggregate(bin(&samples, &config).unwrap())
    }

    fn nearest(grid: &AggregatedGrid, row: usize, col: usize) -> Option<GridCoordinate> {
        nearest_populated(&grid.cells, GridCoordinate::new(row, col))
    }

    #[test]
    fn single_source_fills_everything() {
        let grid = infill(grid_with(6, &[(0, 0)]));
        for (coord, cell) in grid.cells() {
            assert_eq!(cell.means(), Some(&[0.0][..]), "cell {}", coord);
        }
        assert_eq!(grid.infilled_count(), 35);
        assert_eq!(grid.cell_at(5, 5).unwrap().infilled_from(), Some(GridCoordinate::new(0, 0)));
    }

    #[test]
    fn ties_go_to_first_in_scan_order() {
        let grid = grid_with(5, &[(0, 0), (0, 2)]);
        assert_eq!(nearest(&grid, 0, 1), Some(GridCoordinate::new(0, 0)));

        // Above beats below: dy = -1 is scanned first.
        let grid = grid_with(5, &[(0, 1), (2, 1)]);
        assert_eq!(nearest(&grid, 1, 1), Some(GridCoordinate::new(0, 1)));

        // Left beats right within the same row.
        let grid = grid_with(5, &[(1, 0), (1, 2)]);
        assert_eq!(nearest(&grid, 1, 1), Some(GridCoordinate::new(1, 0)));
    }

    #[test]
    fn closest_within_the_box_wins() {
        // Diagonal (distance sqrt 2) is scanned first but the edge neighbour is closer.
        let grid = grid_with(5, &[(1, 1), (2, 3)]);
        assert_eq!(nearest(&grid, 2, 2), Some(GridCoordinate::new(2, 3)));
    }

    #[test]
    fn search_stops_at_first_radius_with_data() {
        // (3, 3) is in the radius-3 box at distance sqrt 18; (0, 4) is closer
        // (distance 4) but only enters the box at radius 4.
        let grid = grid_with(6, &[(3, 3), (0, 4)]);
        assert_eq!(nearest(&grid, 0, 0), Some(GridCoordinate::new(3, 3)));
    }

    #[test]
    fn infill_keeps_counts_and_samples() {
        let grid = infill(grid_with(4, &[(2, 2)]));
        let cell = grid.cell_at(0, 0).unwrap();
        assert!(!cell.has_data());
        assert_eq!(cell.sample_count(), 0);
        assert!(cell.source_samples().is_empty());
        assert_eq!(cell.means(), Some(&[202.0][..]));

        let source = grid.cell_at(2, 2).unwrap();
        assert_eq!(source.infilled_from(), None);
        assert_eq!(source.source_samples().len(), 1);
    }

    #[test]
    fn empty_grid_stays_unresolved() {
        let grid = infill(grid_with(3, &[]));
        assert!(grid.is_empty());
        assert_eq!(grid.infilled_count(), 0);
    }

    #[test]
    fn single_cell_grid() {
        let grid = infill(grid_with(1, &[(0, 0)]));
        assert_eq!(grid.value_at(0, 0, "v"), Some(0.0));
        assert!(nearest(&grid_with(1, &[]), 0, 0).is_none());
    }
}
