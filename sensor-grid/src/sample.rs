use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::MeasurementSchema;
use crate::error::{GridError, Result};

// --------------------------------------------------------------------------
// SampleRecord

/// A sample as it appears in an input file: coordinates plus name-keyed
/// measurements. Fields beyond the schema are kept here but ignored when
/// converting to a [`Sample`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

// --------------------------------------------------------------------------
// Sample

/// One observed record. Measurements are stored in schema order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub latitude: f64,
    pub longitude: f64,
    pub measurements: Vec<f64>,
}

impl Sample {
    pub fn new(latitude: f64, longitude: f64, measurements: Vec<f64>) -> Self {
        Self {
            latitude,
            longitude,
            measurements,
        }
    }

    /// Convert the `index`-th input record, pulling measurements out in schema order.
    pub fn from_record(schema: &MeasurementSchema, index: usize, record: &SampleRecord) -> Result<Self> {
        let measurements = schema
            .names()
            .iter()
            .map(|name| {
                record
                    .values
                    .get(name)
                    .copied()
                    .ok_or_else(|| GridError::MissingMeasurement {
                        measurement: name.clone(),
                        index,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(record.latitude, record.longitude, measurements))
    }

    /// Convert a whole batch of records; the first incomplete record fails the batch.
    pub fn from_records(schema: &MeasurementSchema, records: &[SampleRecord]) -> Result<Vec<Self>> {
        records
            .iter()
            .enumerate()
            .map(|(i, record)| Self::from_record(schema, i, record))
            .collect()
    }

    /// Look a measurement up by name.
    pub fn value(&self, schema: &MeasurementSchema, name: &str) -> Option<f64> {
        schema
            .index_of(name)
            .and_then(|i| self.measurements.get(i).copied())
    }
}

// --------------------------------------------------------------------------
// GridCoordinate

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub row: usize,
    pub col: usize,
}

impl GridCoordinate {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Cell containing the planar point, or `None` when it lies outside a
    /// `side_count x side_count` grid. NaN coordinates are never in-domain.
    pub fn locate(latitude: f64, longitude: f64, cell_size: f64, side_count: usize) -> Option<Self> {
        let row = (latitude / cell_size).floor();
        let col = (longitude / cell_size).floor();
        let side = side_count as f64;
        if (0.0..side).contains(&row) && (0.0..side).contains(&col) {
            Some(Self::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// Center of this cell in the input coordinate space.
    pub fn anchor(&self, cell_size: f64) -> AnchorPoint {
        AnchorPoint {
            x: self.col as f64 * cell_size + cell_size / 2.0,
            y: self.row as f64 * cell_size + cell_size / 2.0,
        }
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// --------------------------------------------------------------------------
// AnchoredSample

/// Display position of a cell; `x` follows longitude and `y` latitude.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub x: f64,
    pub y: f64,
}

/// A binned sample together with the center of the cell it landed in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchoredSample {
    pub sample: Sample,
    pub anchor: AnchorPoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> SampleRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn record_converts_in_schema_order() {
        let schema = MeasurementSchema::default();
        let rec = record(
            r#"{ "latitude": 12.5, "longitude": 40.0, "co2": 55.0, "temperature": 140.0,
                 "humidity": 30.0, "station": 7.0 }"#,
        );
        let sample = Sample::from_record(&schema, 0, &rec).unwrap();
        assert_eq!(sample.measurements, vec![140.0, 30.0, 55.0]);
        assert_eq!(sample.value(&schema, "co2"), Some(55.0));
        assert_eq!(sample.value(&schema, "station"), None);
    }

    #[test]
    fn missing_measurement_names_the_record() {
        let schema = MeasurementSchema::default();
        let records = vec![
            record(r#"{ "latitude": 1.0, "longitude": 1.0, "temperature": 1.0, "humidity": 1.0, "co2": 1.0 }"#),
            record(r#"{ "latitude": 1.0, "longitude": 1.0, "temperature": 1.0, "co2": 1.0 }"#),
        ];
        assert_eq!(
            Sample::from_records(&schema, &records),
            Err(GridError::MissingMeasurement {
                measurement: "humidity".into(),
                index: 1
            })
        );
    }

    #[test]
    fn locate_floors_coordinates() {
        assert_eq!(GridCoordinate::locate(5.0, 5.0, 10.0, 10), Some(GridCoordinate::new(0, 0)));
        assert_eq!(GridCoordinate::locate(95.0, 12.0, 10.0, 10), Some(GridCoordinate::new(9, 1)));
        assert_eq!(GridCoordinate::locate(0.0, 99.999, 10.0, 10), Some(GridCoordinate::new(0, 9)));
    }

    #[test]
    fn locate_rejects_out_of_domain_points() {
        assert_eq!(GridCoordinate::locate(100.0, 5.0, 10.0, 10), None);
        assert_eq!(GridCoordinate::locate(5.0, -0.5, 10.0, 10), None);
        assert_eq!(GridCoordinate::locate(f64::NAN, 5.0, 10.0, 10), None);
        assert_eq!(GridCoordinate::locate(5.0, f64::INFINITY, 10.0, 10), None);
    }

    #[test]
    fn anchor_is_cell_center() {
        let anchor = GridCoordinate::new(9, 2).anchor(10.0);
        assert_eq!(anchor, AnchorPoint { x: 25.0, y: 95.0 });
    }
}
