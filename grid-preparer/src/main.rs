mod colormap;
mod detail;
mod loader;
mod render;
mod snapshot;

use std::path::PathBuf;

use clap::Parser;
use sensor_grid::{build_grid, GridConfig, GridCoordinate, GridError};
use tracing::{info, warn};

use colormap::Colormap;
use render::RenderOptions;

#[derive(clap::Parser)]
struct ClArgs {
    /// Input sample file: JSON array of records, optionally gzip-compressed
    #[arg()]
    input: PathBuf,

    /// Output PNG file path
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Measurement to render
    #[arg(short, long, default_value = "temperature")]
    measurement: String,

    /// JSON grid configuration file (defaults are used for missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured cell size
    #[arg(long)]
    cell_size: Option<f64>,

    /// Color scheme to use
    #[arg(long, value_enum, default_value_t = Colormap::Hue)]
    colormap: Colormap,

    /// Tile size in the output image
    #[arg(long, default_value_t = 40, value_parser = clap::value_parser!(u32).range(1..=1024))]
    pixels_per_cell: u32,

    /// Do not draw sample markers
    #[arg(long)]
    no_markers: bool,

    /// Print means and source samples of the cell at ROW,COL
    #[arg(long, value_name = "ROW,COL", value_parser = detail::parse_cell)]
    cell: Option<GridCoordinate>,

    /// Also write the rendered measurement layer as a binary snapshot
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbosity: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ClArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level(args.verbosity))),
        )
        .init();

    run(&args)
}

fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Legend stops as `Cold 70° | Cool 105° | ...`, bare values when unlabelled.
fn legend_line(range: &sensor_grid::MeasurementRange) -> String {
    range
        .legend(5)
        .iter()
        .map(|stop| {
            if stop.label.is_empty() {
                format!("{}{}", stop.value, range.unit)
            } else {
                format!("{} {}{}", stop.label, stop.value, range.unit)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn run(args: &ClArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            loader::load_config(path)?
        }
        None => GridConfig::default(),
    };
    if let Some(cell_size) = args.cell_size {
        config.cell_size = cell_size;
    }
    let side_count = config.side_count()?;
    config.schema.require(&args.measurement)?;

    println!("Loading samples from: {}", args.input.display());
    let samples = loader::load_samples(&args.input, &config.schema)?;
    println!("Loaded {} samples", samples.len());

    let grid = match build_grid(&samples, &config) {
        Ok(grid) => grid,
        Err(GridError::EmptyDataset { discarded }) => {
            warn!("No samples inside the grid ({} discarded)", discarded);
            println!("No samples fall inside the {0}x{0} grid; nothing to render", side_count);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!(
        "Built {0}x{0} grid: {1} populated cells, {2} infilled, {3} samples outside the grid",
        grid.side_count(),
        grid.populated_count(),
        grid.infilled_count(),
        grid.discarded_count()
    );
    for name in grid.schema().names() {
        if let Some((lo, hi)) = grid.mean_bounds(name) {
            println!("  {}: cell means {:.1} .. {:.1}", name, lo, hi);
        }
    }

    let range = render::display_range(&grid, config.range_for(&args.measurement), &args.measurement)
        .ok_or_else(|| GridError::UnknownMeasurement(args.measurement.clone()))?;
    println!("{} scale: {}", range.label, legend_line(&range));

    if let Some(coord) = args.cell {
        let text = detail::describe_cell(&grid, &config, coord).ok_or_else(|| {
            format!("Cell {} is outside the {1}x{1} grid", coord, grid.side_count())
        })?;
        print!("{}", text);
    }

    println!("Generating heatmap with {:?} colormap...", args.colormap);
    let options = RenderOptions {
        colormap: args.colormap,
        pixels_per_cell: args.pixels_per_cell,
        markers: !args.no_markers,
    };
    render::save_heatmap_to_png(&grid, &range, &args.output, options)?;
    println!("Heatmap saved to: {}", args.output.display());

    if let Some(path) = &args.snapshot {
        snapshot::write_snapshot(&grid, &args.measurement, path)?;
        println!("Snapshot saved to: {}", path.display());
    }
    Ok(())
}
