//! Command-line renderer
//!
//! Runs a command file, writes the rendered image as PNG and prints the
//! render statistics, optionally compared against a solution image.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use softrast::codec;
use softrast::command::Session;
use softrast::compare;
use softrast::config::{self, RenderConfig};

/// softrast - software triangle rasterizer
#[derive(Parser, Debug)]
#[command(name = "softrast", version, about = "Renders a command file to a PNG image")]
struct Args {
    /// Command file to execute
    #[arg(short, long)]
    input: PathBuf,

    /// Solution image to compare the result against
    #[arg(short, long)]
    solution: Option<PathBuf>,

    /// Write statistics here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// RON render configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the rendered image
    #[arg(long, default_value = "output.png")]
    image: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("softrast v{}", softrast::VERSION);

    let settings = match &args.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };
    let tolerance = settings.tolerance;

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let base_dir = args.input.parent().unwrap_or(Path::new("."));

    let mut session = Session::new(settings, base_dir);
    session
        .run(&text)
        .with_context(|| format!("Error in {}", args.input.display()))?;

    let driver = session.into_driver();
    let fb = driver
        .framebuffer()
        .context("Command file never set the image size")?;
    codec::encode_image(&fb.color, fb.width(), fb.height(), &args.image)?;

    let mut report = String::new();
    writeln!(report, "{}", driver.stats())?;

    if let Some(path) = &args.solution {
        let (expected, width, height) = codec::decode_image(path)?;
        let cmp = compare::compare(
            &fb.color,
            &expected,
            (fb.width(), fb.height()),
            (width, height),
            tolerance,
        )
        .with_context(|| format!("Cannot compare with {}", path.display()))?;
        if !cmp.is_match() {
            warn!("{} pixels differ from {}", cmp.mismatched, path.display());
        }
        write!(report, "{cmp}")?;
    }

    match &args.output {
        Some(path) => fs::write(path, &report)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{report}"),
    }
    Ok(())
}
