use crate::config::{Config, load_config};
use crate::dump::write_geometry_dump;
use crate::ir::{BuildingGeometry, Orientation};
use crate::normalize::{normalize, parse_building_spec};
use crate::render::section::SectionCut;
use crate::render::write_output_svg;
use crate::theme::Theme;
use crate::views::{RenderedView, ViewRequest, render_all, render_view};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "archdraw",
    version,
    about = "Deterministic floor plans, elevations and sections from building geometry JSON"
)]
pub struct Args {
    /// Input building description (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file, or directory for `--view all`. Defaults to stdout for a single SVG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, plan, elevation and door-swing overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Which drawing to produce
    #[arg(long = "view", value_enum, default_value = "plan")]
    pub view: ViewKind,

    /// Floor index for `--view plan`
    #[arg(long = "floor", default_value_t = 0)]
    pub floor: u32,

    /// Facade for `--view elevation` (north|east|south|west)
    #[arg(long = "side", default_value = "north")]
    pub side: String,

    /// Cut for `--view section` (A-A|B-B)
    #[arg(long = "cut", default_value = "A-A")]
    pub cut: String,

    /// Room count the floor plan must show
    #[arg(long = "expected-rooms")]
    pub expected_rooms: Option<usize>,

    /// Pixels per metre, applied to every view
    #[arg(long = "scale")]
    pub scale: Option<f64>,

    /// Sheet margin in pixels, applied to every view
    #[arg(long = "margin")]
    pub margin: Option<f64>,

    #[arg(long = "no-furniture")]
    pub no_furniture: bool,

    #[arg(long = "no-dimensions")]
    pub no_dimensions: bool,

    #[arg(long = "no-door-swings")]
    pub no_door_swings: bool,

    /// Write the normalized geometry as pretty JSON
    #[arg(long = "dump-geometry")]
    pub dump_geometry: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Plan,
    Elevation,
    Section,
    All,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = apply_overrides(load_config(args.config.as_deref())?, &args);

    let input = read_input(args.input.as_deref())?;
    let raw = parse_building_spec(&input)?;
    let geometry = normalize(&raw);

    if let Some(path) = args.dump_geometry.as_deref() {
        write_geometry_dump(path, &geometry)?;
        info!(path = %path.display(), "wrote geometry dump");
    }

    if args.view == ViewKind::All {
        return render_view_set(&geometry, &config, &args);
    }

    let request = single_request(&args)?;
    let view = render_view(&geometry, request, &config)?;
    for warning in &view.validation.warnings {
        warn!(view = %request, "{warning}");
    }
    write_view(&view, args.output.as_deref(), args.output_format, &config.theme)?;
    info!(view = %request, fingerprint = %view.fingerprint, "wrote panel");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    let json = std::env::var("ARCHDRAW_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    // A subscriber may already be installed when run() is embedded.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(scale) = args.scale {
        config.plan.scale = scale;
        config.elevation.scale = scale;
    }
    if let Some(margin) = args.margin {
        config.plan.margin = margin;
        config.elevation.margin = margin;
    }
    if let Some(expected) = args.expected_rooms {
        config.plan.expected_room_count = expected;
    }
    if args.no_furniture {
        config.plan.show_furniture = false;
    }
    if args.no_dimensions {
        config.plan.show_dimensions = false;
    }
    if args.no_door_swings {
        config.plan.show_door_swings = false;
    }
    config
}

fn single_request(args: &Args) -> Result<ViewRequest> {
    Ok(match args.view {
        ViewKind::Plan => ViewRequest::FloorPlan(args.floor),
        ViewKind::Elevation => ViewRequest::Elevation(
            Orientation::from_token(&args.side)
                .ok_or_else(|| anyhow::anyhow!("unknown facade '{}'", args.side))?,
        ),
        ViewKind::Section => ViewRequest::Section(
            SectionCut::from_token(&args.cut)
                .ok_or_else(|| anyhow::anyhow!("unknown section cut '{}'", args.cut))?,
        ),
        ViewKind::All => return Err(anyhow::anyhow!("--view all renders into a directory")),
    })
}

fn render_view_set(geometry: &BuildingGeometry, config: &Config, args: &Args) -> Result<()> {
    let dir = args
        .output
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Output directory required for --view all"))?;
    std::fs::create_dir_all(dir)?;

    let requests = ViewRequest::full_set(geometry);
    let results = render_all(geometry, &requests, config);
    let mut failed = 0;
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(view) => {
                let path = dir.join(format!("{}.{}", request.slug(), args.output_format.extension()));
                write_view(&view, Some(&path), args.output_format, &config.theme)?;
                info!(view = %request, path = %path.display(), "wrote panel");
            }
            Err(err) => {
                failed += 1;
                warn!(view = %request, code = err.code(), "{err}");
            }
        }
    }
    if failed > 0 {
        return Err(anyhow::anyhow!("{failed} of {} views failed", requests.len()));
    }
    Ok(())
}

fn write_view(
    view: &RenderedView,
    output: Option<&Path>,
    format: OutputFormat,
    theme: &Theme,
) -> Result<()> {
    match format {
        OutputFormat::Svg => write_output_svg(&view.svg, output),
        OutputFormat::Png => {
            let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_png(&view.svg, output, theme)
        }
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    crate::render::write_output_png(svg, output, theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
