use std::path::Path;

use plotters::prelude::*;
use sensor_grid::{AnchoredSample, Grid, MeasurementRange};
use tracing::{debug, span, Level};

use crate::colormap::Colormap;

const MARKER_RADIUS: i32 = 5;

/// Largest output image side, in pixels.
pub const MAX_IMAGE_SIDE: u32 = 16384;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub colormap: Colormap,
    pub pixels_per_cell: u32,
    /// Draw a marker at every source sample
    pub markers: bool,
}

/// Display range for `measurement`: the configured one if any, otherwise the
/// spread of the grid's own means.
pub fn display_range(
    grid: &Grid,
    configured: Option<&MeasurementRange>,
    measurement: &str,
) -> Option<MeasurementRange> {
    if let Some(range) = configured {
        return Some(range.clone());
    }
    let (lo, hi) = grid.mean_bounds(measurement)?;
    let (lo, hi) = if lo < hi { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    Some(MeasurementRange::new(measurement, lo, hi))
}

/// Colour of a tile holding `value`.
pub fn tile_color(value: f64, range: &MeasurementRange, colormap: Colormap) -> RGBColor {
    let (r, g, b) = colormap.map(range.normalize(value));
    RGBColor(r, g, b)
}

/// Pixel position of a sample marker: its own coordinates, scaled like the tiles.
pub fn marker_position(point: &AnchoredSample, cell_size: f64, pixels_per_cell: u32) -> (i32, i32) {
    let scale = pixels_per_cell as f64 / cell_size;
    (
        (point.sample.longitude * scale).round() as i32,
        (point.sample.latitude * scale).round() as i32,
    )
}

/// Side of the output image, or `None` if it would exceed [`MAX_IMAGE_SIDE`].
pub fn image_side(side_count: usize, pixels_per_cell: u32) -> Option<u32> {
    u32::try_from(side_count)
        .ok()?
        .checked_mul(pixels_per_cell)
        .filter(|&side| side <= MAX_IMAGE_SIDE)
}

/// Paint one tile per cell, coloured by `range.measurement`, and save to PNG.
/// Row 0 is drawn at the top.
pub fn save_heatmap_to_png(
    grid: &Grid,
    range: &MeasurementRange,
    output_path: &Path,
    options: RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let _span = span!(Level::TRACE, "save_heatmap_to_png").entered();

    let ppc = options.pixels_per_cell.max(1);
    let side = image_side(grid.side_count(), ppc).ok_or_else(|| {
        format!(
            "{0}x{0} cells at {1} pixels per cell exceeds the {2} pixel image limit",
            grid.side_count(),
            ppc,
            MAX_IMAGE_SIDE
        )
    })?;
    let root = BitMapBackend::new(output_path, (side, side)).into_drawing_area();
    root.fill(&BLACK)?;

    for (coord, cell) in grid.cells() {
        // Only an empty grid leaves a cell without means; keep it black.
        let Some(value) = cell.mean(grid.schema(), &range.measurement) else {
            continue;
        };
        // Bounded by `side`, which fits in i32.
        let x0 = (coord.col as u32 * ppc) as i32;
        let y0 = (coord.row as u32 * ppc) as i32;
        let step = ppc as i32;
        let color = tile_color(value, range, options.colormap);
        root.draw(&Rectangle::new(
            [(x0, y0), (x0 + step, y0 + step)],
            color.filled(),
        ))?;
    }

    if options.markers {
        let mut drawn = 0;
        for (_, _, points) in grid.markers() {
            for point in points {
                let center = marker_position(point, grid.cell_size(), ppc);
                root.draw(&Circle::new(center, MARKER_RADIUS, WHITE.filled()))?;
                root.draw(&Circle::new(center, MARKER_RADIUS, BLACK.stroke_width(2)))?;
                drawn += 1;
            }
        }
        debug!("Drew {} sample markers", drawn);
    }

    root.present()?;
    Ok(())
}
