//! Bin geo-tagged sensor samples into a square grid, average each cell and
//! fill empty cells from their nearest populated neighbour, producing a dense
//! grid ready to be drawn as a heatmap.
//!
//! ```text
//!   samples ──bin──▶ BinnedGrid ──aggregate──▶ AggregatedGrid ──infill──▶ Grid
//! ```
//!
//! Each stage is a plain function consuming the previous stage's output, so
//! they can be run and inspected one at a time. [`build_grid`] runs all three.
//!
//! Coordinates are planar: `latitude` selects the row and `longitude` the
//! column, both in `0..domain_extent`.
//!
//! ```
//! use sensor_grid::{build_grid, GridConfig, MeasurementSchema, Sample};
//!
//! let config = GridConfig::new(100.0, 10.0, MeasurementSchema::new(["temperature"]));
//! let samples = vec![
//!     Sample::new(5.0, 5.0, vec![100.0]),
//!     Sample::new(5.0, 5.0, vec![200.0]),
//!     Sample::new(95.0, 95.0, vec![50.0]),
//! ];
//! let grid = build_grid(&samples, &config).unwrap();
//! assert_eq!(grid.value_at(0, 0, "temperature"), Some(150.0));
//! assert_eq!(grid.value_at(9, 9, "temperature"), Some(50.0));
//! ```

pub mod aggregator;
pub mod binner;
pub mod config;
pub mod error;
pub mod grid;
pub mod infill;
pub mod sample;
pub mod storage;

use tracing::{debug, span, Level};

pub use aggregator::{aggregate, AggregatedCell, AggregatedGrid};
pub use binner::{bin, BinnedCell, BinnedGrid};
pub use config::{
    GridConfig, LegendStop, MeasurementRange, MeasurementSchema, RampDirection, MAX_SIDE_COUNT,
};
pub use error::{GridError, Result};
pub use grid::{Cell, Grid};
pub use infill::infill;
pub use sample::{AnchorPoint, AnchoredSample, GridCoordinate, Sample, SampleRecord};

/// Run binning, aggregation and infilling over `samples`.
///
/// Fails fast on an invalid configuration, and returns
/// [`GridError::EmptyDataset`] instead of a grid when no sample lands inside it.
pub fn build_grid(samples: &[Sample], config: &GridConfig) -> Result<Grid> {
    let _span = span!(Level::DEBUG, "build_grid", samples = samples.len()).entered();

    let aggregated = aggregate(bin(samples, config)?);
    if aggregated.populated_count() == 0 {
        return Err(GridError::EmptyDataset {
            discarded: aggregated.discarded,
        });
    }

    let grid = infill(aggregated);
    debug!(
        "Built {}x{} grid: {} populated cells, {} infilled, {} samples dropped",
        grid.side_count(),
        grid.side_count(),
        grid.populated_count(),
        grid.infilled_count(),
        grid.discarded_count()
    );
    Ok(grid)
}
