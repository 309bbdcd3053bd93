//! Text detail for one grid cell and the samples binned into it.

use std::fmt::Write;

use sensor_grid::{GridConfig, GridCoordinate, Grid, Sample};

/// Parse a `row,col` pair.
pub fn parse_cell(text: &str) -> Result<GridCoordinate, String> {
    let (row, col) = text
        .split_once(',')
        .ok_or_else(|| format!("Expected ROW,COL, got `{}`", text))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|e| format!("Invalid cell index `{}`: {}", part, e))
    };
    Ok(GridCoordinate::new(parse(row)?, parse(col)?))
}

/// `value` with the measurement's configured label and unit, e.g. `Humidity: 40.0%`.
fn measurement_line(config: &GridConfig, name: &str, value: f64) -> String {
    match config.range_for(name) {
        Some(range) => format!("{}: {:.1}{}", range.label, value, range.unit),
        None => format!("{}: {:.1}", name, value),
    }
}

/// Coordinates and every schema measurement of one sample.
pub fn describe_sample(config: &GridConfig, sample: &Sample) -> Vec<String> {
    let mut lines = vec![
        format!("Latitude: {:.2}°", sample.latitude),
        format!("Longitude: {:.2}°", sample.longitude),
    ];
    for name in config.schema.names() {
        if let Some(value) = sample.value(&config.schema, name) {
            lines.push(measurement_line(config, name, value));
        }
    }
    lines
}

/// Means, provenance and source samples of the cell at `coord`, or `None`
/// if the cell is off the grid.
pub fn describe_cell(grid: &Grid, config: &GridConfig, coord: GridCoordinate) -> Option<String> {
    let cell = grid.cell_at(coord.row, coord.col)?;
    let mut out = String::new();

    let origin = match cell.infilled_from() {
        Some(from) => format!("infilled from {}", from),
        None if cell.has_data() => format!("{} samples", cell.sample_count()),
        None => "no data".to_string(),
    };
    let _ = writeln!(out, "Cell {} ({})", coord, origin);
    for name in grid.schema().names() {
        if let Some(mean) = cell.mean(grid.schema(), name) {
            let _ = writeln!(out, "  {}", measurement_line(config, name, mean));
        }
    }
    for (i, point) in cell.source_samples().iter().enumerate() {
        let _ = writeln!(
            out,
            "  Sample {} (anchor {:.1}, {:.1})",
            i + 1,
            point.anchor.x,
            point.anchor.y
        );
        for line in describe_sample(config, &point.sample) {
            let _ = writeln!(out, "    {}", line);
        }
    }
    Some(out)
}
