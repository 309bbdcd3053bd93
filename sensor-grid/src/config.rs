//! Configuration types for the sample grid.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Relative tolerance when checking that the cell size divides the extent.
const DIVISIBILITY_TOLERANCE: f64 = 1e-9;

/// Largest supported number of cells per side.
pub const MAX_SIDE_COUNT: usize = 4096;

// --------------------------------------------------------------------------
// MeasurementSchema

/// Ordered list of measurement names carried by every sample.
///
/// Per-sample and per-cell values are stored in schema order, so the index of
/// a name here is also its index into those value slices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementSchema {
    names: Vec<String>,
}

impl MeasurementSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of `name` in the schema, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Like [`index_of`](Self::index_of), but an absent name is an error.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| GridError::UnknownMeasurement(name.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.names.is_empty() {
            return Err(GridError::EmptySchema);
        }
        for (i, name) in self.names.iter().enumerate() {
            if self.names[..i].contains(name) {
                return Err(GridError::DuplicateMeasurement(name.clone()));
            }
        }
        Ok(())
    }
}

impl Default for MeasurementSchema {
    fn default() -> Self {
        Self::new(["temperature", "humidity", "co2"])
    }
}

// --------------------------------------------------------------------------
// MeasurementRange

/// Which end of the display ramp the low end of a range maps to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RampDirection {
    /// `min` maps to 0.0 and `max` to 1.0.
    #[default]
    LowToHigh,
    /// `min` maps to 1.0 and `max` to 0.0.
    HighToLow,
}

/// A labelled value on a measurement's legend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegendStop {
    pub value: f64,
    #[serde(default)]
    pub label: String,
}

impl LegendStop {
    pub fn new(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Display range of one measurement, consumed by colour mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRange {
    pub measurement: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub direction: RampDirection,
    /// Named legend stops; empty means evenly spaced, unlabelled stops
    #[serde(default)]
    pub legend: Vec<LegendStop>,
}

impl MeasurementRange {
    pub fn new(measurement: impl Into<String>, min: f64, max: f64) -> Self {
        let measurement = measurement.into();
        Self {
            label: measurement.clone(),
            measurement,
            min,
            max,
            unit: String::new(),
            direction: RampDirection::LowToHigh,
            legend: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_direction(mut self, direction: RampDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Label evenly spaced legend stops, one label per stop from `min` to `max`.
    pub fn with_legend_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        self.legend = self
            .legend_stops(labels.len())
            .into_iter()
            .zip(labels)
            .map(|(value, label)| LegendStop { value, label })
            .collect();
        self
    }

    /// Map `value` linearly onto `[0.0, 1.0]`, clamping values outside the range.
    pub fn normalize(&self, value: f64) -> f64 {
        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        match self.direction {
            RampDirection::LowToHigh => t,
            RampDirection::HighToLow => 1.0 - t,
        }
    }

    /// `count` evenly spaced values from `min` to `max` inclusive, for legends.
    pub fn legend_stops(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => {
                let step = (self.max - self.min) / (count - 1) as f64;
                (0..count).map(|i| self.min + step * i as f64).collect()
            }
        }
    }

    /// The configured legend, or `count` unlabelled evenly spaced stops when
    /// none is configured.
    pub fn legend(&self, count: usize) -> Vec<LegendStop> {
        if !self.legend.is_empty() {
            return self.legend.clone();
        }
        self.legend_stops(count)
            .into_iter()
            .map(|value| LegendStop::new(value, ""))
            .collect()
    }
}

// --------------------------------------------------------------------------
// GridConfig

/// Grid configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Side length of the square planar domain, starting at 0
    pub domain_extent: f64,

    /// Side length of one cell, in domain units
    pub cell_size: f64,

    /// Measurements every sample carries
    pub schema: MeasurementSchema,

    /// Display ranges, at most one per measurement
    pub ranges: Vec<MeasurementRange>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            domain_extent: 100.0,
            cell_size: 10.0, // 10 x 10 cells
            schema: MeasurementSchema::default(),
            ranges: vec![
                MeasurementRange::new("temperature", 70.0, 210.0)
                    .with_unit("°")
                    .with_label("Temperature")
                    .with_legend_labels(["Cold", "Cool", "Moderate", "Warm", "Hot"]),
                MeasurementRange::new("humidity", 10.0, 70.0)
                    .with_unit("%")
                    .with_label("Humidity")
                    .with_legend_labels(["Very Dry", "Dry", "Moderate", "Humid", "Very Humid"]),
                MeasurementRange::new("co2", 10.0, 100.0)
                    .with_unit(" ppm")
                    .with_label("CO2")
                    .with_legend_labels([
                        "Low",
                        "Moderate-Low",
                        "Moderate",
                        "Moderate-High",
                        "High",
                    ]),
            ],
        }
    }
}

impl GridConfig {
    /// Configuration without display ranges.
    pub fn new(domain_extent: f64, cell_size: f64, schema: MeasurementSchema) -> Self {
        Self {
            domain_extent,
            cell_size,
            schema,
            ranges: Vec::new(),
        }
    }

    pub fn with_range(mut self, range: MeasurementRange) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn range_for(&self, measurement: &str) -> Option<&MeasurementRange> {
        self.ranges.iter().find(|r| r.measurement == measurement)
    }

    /// Validate the configuration and return the number of cells per side.
    pub fn side_count(&self) -> Result<usize> {
        if !(self.domain_extent.is_finite() && self.domain_extent > 0.0) {
            return Err(GridError::InvalidExtent(self.domain_extent));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(self.cell_size));
        }

        // A subnormal cell size overflows the ratio to infinity.
        let ratio = self.domain_extent / self.cell_size;
        let rounded = ratio.round();
        if !(ratio.is_finite() && rounded <= MAX_SIDE_COUNT as f64) {
            return Err(GridError::TooManyCells {
                side_count: ratio,
                max: MAX_SIDE_COUNT,
            });
        }
        if rounded < 1.0 || (ratio - rounded).abs() > DIVISIBILITY_TOLERANCE * ratio {
            return Err(GridError::UnevenCellSize {
                extent: self.domain_extent,
                cell_size: self.cell_size,
            });
        }

        self.schema.validate()?;
        for range in &self.ranges {
            self.schema.require(&range.measurement)?;
            if !(range.min.is_finite() && range.max.is_finite() && range.min < range.max) {
                return Err(GridError::InvalidRange {
                    measurement: range.measurement.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
        }

        Ok(rounded as usize)
    }
}
