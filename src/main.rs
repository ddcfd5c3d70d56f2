use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lineart_extract::{LineartExtractor, LineartParams, ModelVariant, OutputFormat};

#[derive(Parser)]
#[command(name = "lineart-extract")]
#[command(about = "Extract binary lineart masks from images with a learned line detector")]
#[command(after_help = "Examples:
    lineart-extract input.jpg output.png
    lineart-extract input.jpg output.png --coarse --threshold 100
    lineart-extract input.jpg output.png --no-morphology --format rgba")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path to output lineart file (png, tif or bmp)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Directory containing sk_model.rten (fine) and sk_model2.rten (coarse)
    #[arg(long, value_name = "DIR", env = "LINEART_MODEL_DIR", default_value = "models")]
    model_dir: PathBuf,

    /// Use the coarse model (sk_model2) for faster processing
    #[arg(long)]
    coarse: bool,

    /// Threshold for binary conversion (0-255)
    #[arg(long, default_value_t = 127, allow_negative_numbers = true)]
    threshold: i32,

    /// Skip morphological noise removal
    #[arg(long)]
    no_morphology: bool,

    /// Output channel layout: binary, rgb or rgba
    #[arg(long, default_value = "binary")]
    format: String,

    /// Save every intermediate stage to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "lineart_extract=debug"
    } else {
        "lineart_extract=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn run(args: Cli) -> anyhow::Result<()> {
    let format: OutputFormat = args.format.parse()?;
    let params = LineartParams::new()
        .with_threshold(args.threshold)
        .with_morphology(!args.no_morphology)
        .with_format(format)
        .with_variant(ModelVariant::from_coarse(args.coarse));
    params.validate()?;

    let mut extractor = LineartExtractor::from_model_dir(&args.model_dir);
    if let Some(debug_dir) = args.debug_out {
        extractor = extractor.with_debug(debug_dir)?;
    }

    extractor
        .prepare(&params)
        .with_context(|| format!("model directory: {}", args.model_dir.display()))?;

    let encoded = extractor
        .extract_file(&args.input, &args.output, &params)
        .with_context(|| format!("extracting lineart from {}", args.input.display()))?;

    tracing::debug!(
        width = encoded.width(),
        height = encoded.height(),
        channels = encoded.channel_count(),
        "done"
    );
    Ok(())
}
