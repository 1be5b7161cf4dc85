use clap::Parser;
use image::ImageReader;
use std::path::PathBuf;
use tracing::{Level, debug};

use segmpredict::{PredictorInput, SegmPredictor};

#[derive(Parser)]
#[command(name = "segmpredict")]
#[command(about = "Segment document fields and print their polygons as JSON")]
struct Cli {
    /// Path(s) to input image file(s)
    #[arg(value_name = "IMAGE", required = true)]
    image_paths: Vec<PathBuf>,

    /// Path to the exported .rten model
    #[arg(short, long, value_name = "MODEL")]
    model: PathBuf,

    /// Path to the JSON model config
    #[arg(short, long, value_name = "CONFIG")]
    config: PathBuf,

    /// Write JSON to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Save thresholded masks to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut predictor = SegmPredictor::from_files(&args.model, &args.config)?;
    if let Some(debug_dir) = args.debug_out {
        predictor = predictor.with_debug(debug_dir)?;
    }

    let mut images = Vec::with_capacity(args.image_paths.len());
    for path in &args.image_paths {
        debug!("Loading image: {:?}", path);
        let img = ImageReader::open(path)?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;
        debug!("Image loaded: {}x{}", img.width(), img.height());
        images.push(img);
    }

    // One path prints a single object, several print an array
    let input = if images.len() == 1 {
        PredictorInput::Single(images.remove(0))
    } else {
        PredictorInput::Batch(images)
    };

    let output = predictor.predict(input)?;
    let json = serde_json::to_string_pretty(&output)?;

    match args.output {
        Some(path) => std::fs::write(&path, json)?,
        None => println!("{}", json),
    }

    Ok(())
}
