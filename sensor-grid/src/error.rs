//! Grid pipeline errors

use thiserror::Error;

/// Result type for the grid pipeline
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised while configuring or running the grid pipeline.
///
/// Samples falling outside the grid are not errors; they are dropped and
/// counted (see [`crate::Grid::discarded_count`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("domain extent must be finite and positive, got {0}")]
    InvalidExtent(f64),

    #[error("cell size must be finite and positive, got {0}")]
    InvalidCellSize(f64),

    #[error("cell size {cell_size} does not evenly divide domain extent {extent}")]
    UnevenCellSize { extent: f64, cell_size: f64 },

    #[error("{side_count} cells per side exceeds the limit of {max}")]
    TooManyCells { side_count: f64, max: usize },

    #[error("measurement schema is empty")]
    EmptySchema,

    #[error("measurement `{0}` appears more than once in the schema")]
    DuplicateMeasurement(String),

    #[error("unknown measurement `{0}`")]
    UnknownMeasurement(String),

    #[error("invalid range for `{measurement}`: min {min} must be below max {max}")]
    InvalidRange { measurement: String, min: f64, max: f64 },

    #[error("record {index} is missing measurement `{measurement}`")]
    MissingMeasurement { measurement: String, index: usize },

    #[error("no samples fall inside the grid ({discarded} discarded)")]
    EmptyDataset { discarded: usize },
}
