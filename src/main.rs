//! Dosha Balance CLI
//!
//! Command-line front end for the dosha balance widget.
//!
//! # Commands
//!
//! - `project`: weights -> triangle point
//! - `inverse`: triangle point -> weights
//! - `drag`: replay pointer positions through a settled interactive widget
//! - `render`: rasterise the widget to PNG

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use dosha_balance::domain::projection;
use dosha_balance::input::PointerEvent;
use dosha_balance::ui::{DoshaRenderer, LabelFont};
use dosha_balance::{DoshaBalanceWidget, DoshaWeights, TrianglePoint, WidgetConfig, WidgetSize};

/// Dosha Balance - forward/inverse triangle projection and rendering
#[derive(Parser)]
#[command(name = "dosha-balance")]
#[command(version = "0.1.0")]
#[command(about = "Project dosha weights onto the balance triangle and back")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON widget configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct WeightArgs {
    #[arg(long, default_value_t = 33.0)]
    vata: f64,
    #[arg(long, default_value_t = 33.0)]
    pitta: f64,
    #[arg(long, default_value_t = 34.0)]
    kapha: f64,
}

impl From<WeightArgs> for DoshaWeights {
    fn from(args: WeightArgs) -> Self {
        DoshaWeights::new(args.vata, args.pitta, args.kapha)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the triangle point for a set of weights
    Project(WeightArgs),
    /// Print the weights for a point in triangle units
    Inverse {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },
    /// Replay pointer positions (canvas pixels) and print each change
    Drag {
        #[command(flatten)]
        weights: WeightArgs,
        /// Positions as `x,y`, relative to the rendered canvas
        #[arg(long, required = true, num_args = 1.., value_parser = parse_position, allow_hyphen_values = true)]
        points: Vec<(f64, f64)>,
        /// Deliver positions as touch events instead of mouse moves
        #[arg(long)]
        touch: bool,
    },
    /// Render the widget to a PNG file
    Render {
        #[command(flatten)]
        weights: WeightArgs,
        #[arg(long)]
        out: PathBuf,
        /// TrueType/OpenType font for labels and readout
        #[arg(long)]
        font: Option<PathBuf>,
        /// Overrides the configured size (sm, md, lg)
        #[arg(long)]
        size: Option<WidgetSize>,
        /// Render as just mounted, before the indicator appears
        #[arg(long)]
        animating: bool,
    },
}

fn parse_position(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{raw}'"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x in '{raw}': {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y in '{raw}': {e}"))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => WidgetConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => WidgetConfig::default(),
    };

    match cli.command {
        Commands::Project(weights) => {
            let weights = DoshaWeights::from(weights);
            let point = projection::forward(&config.triangle(), &weights);
            info!(?weights, ?point, "forward projection");
            println!("{}", serde_json::to_string(&point)?);
        }
        Commands::Inverse { x, y } => {
            let point = TrianglePoint::new(x, y);
            let weights = projection::inverse(&config.triangle(), &point);
            info!(?point, ?weights, "inverse projection");
            println!("{}", serde_json::to_string(&weights)?);
        }
        Commands::Drag { weights, points, touch } => run_drag(config, weights.into(), &points, touch)?,
        Commands::Render { weights, out, font, size, animating } => {
            let mut config = config;
            if let Some(size) = size {
                config.size = size;
            }
            run_render(config, weights.into(), &out, font, animating)?;
        }
    }

    Ok(())
}

fn run_drag(
    config: WidgetConfig,
    initial: DoshaWeights,
    points: &[(f64, f64)],
    touch: bool,
) -> Result<()> {
    let config = WidgetConfig { interactive: true, ..config };
    let mounted = Instant::now();
    let settle_at = mounted + config.settle_delay();

    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let mut widget = DoshaBalanceWidget::mounted_at(config, initial, mounted)
        .with_observer(move |w| sink.borrow_mut().push(w));
    widget.tick_at(settle_at);

    let surface = widget.layout()?.view_box_rect(0.0, 0.0);
    for &(x, y) in points {
        let event = if touch {
            PointerEvent::touch(x, y)
        } else {
            PointerEvent::mouse(x, y)
        };
        widget.handle_pointer(&event, &surface)?;
    }
    widget.teardown();

    for weights in changes.borrow().iter() {
        println!("{}", serde_json::to_string(weights)?);
    }
    info!(events = points.len(), changes = changes.borrow().len(), "drag replayed");
    Ok(())
}

fn run_render(
    config: WidgetConfig,
    weights: DoshaWeights,
    out: &Path,
    font: Option<PathBuf>,
    animating: bool,
) -> Result<()> {
    let mounted = Instant::now();
    let settle_at = mounted + config.settle_delay();
    let mut widget = DoshaBalanceWidget::mounted_at(config, weights, mounted);
    if !animating {
        widget.tick_at(settle_at);
    }

    let renderer = match font {
        Some(path) => DoshaRenderer::with_font(
            LabelFont::load(&path).with_context(|| format!("loading font {}", path.display()))?,
        ),
        None => DoshaRenderer::new(),
    };

    let layout = widget.layout()?;
    let pixmap = renderer.render_layout(&layout)?;
    renderer
        .save_png(&pixmap, out)
        .with_context(|| format!("writing {}", out.display()))?;

    info!(
        path = %out.display(),
        width = pixmap.width(),
        height = pixmap.height(),
        state = ?widget.state(),
        "rendered widget"
    );
    Ok(())
}
