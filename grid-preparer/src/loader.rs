use std::io::{BufRead, Read};
use std::path::Path;

use flate2::bufread::GzDecoder;
use sensor_grid::{GridConfig, MeasurementSchema, Sample, SampleRecord};
use tracing::{debug, span, Level};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// --------------------------------------------------------------------------
// SampleStream

/// Reader over an input file that may or may not be gzip-compressed.
pub enum SampleStream<R: BufRead> {
    Plain(R),
    Gzip(GzDecoder<R>),
}

impl<R: BufRead> SampleStream<R> {
    /// Peek at the first bytes and pick the matching reader.
    pub fn sniff(mut reader: R) -> std::io::Result<Self> {
        let head = reader.fill_buf()?;
        if head.starts_with(&GZIP_MAGIC) {
            debug!("Input is gzip-compressed");
            Ok(SampleStream::Gzip(GzDecoder::new(reader)))
        } else {
            Ok(SampleStream::Plain(reader))
        }
    }
}

impl<R: BufRead> Read for SampleStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            SampleStream::Plain(reader) => reader.read(buf),
            SampleStream::Gzip(decoder) => decoder.read(buf),
        }
    }
}

// --------------------------------------------------------------------------
// Loading

/// Parse a JSON array of sample records and convert them against `schema`.
pub fn read_samples<R: BufRead>(reader: R, schema: &MeasurementSchema) -> std::io::Result<Vec<Sample>> {
    let _span = span!(Level::TRACE, "read_samples").entered();

    let stream = SampleStream::sniff(reader)?;
    let records: Vec<SampleRecord> = serde_json::from_reader(stream)?;
    debug!("Parsed {} records", records.len());

    Sample::from_records(schema, &records)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

pub fn load_samples(path: &Path, schema: &MeasurementSchema) -> std::io::Result<Vec<Sample>> {
    let file = std::io::BufReader::new(std::fs::File::open(path)?);
    read_samples(file, schema)
}

/// Read a JSON grid configuration. Missing fields take their defaults.
pub fn load_config(path: &Path) -> std::io::Result<GridConfig> {
    let file = std::io::BufReader::new(std::fs::File::open(path)?);
    Ok(serde_json::from_reader(file)?)
}
