use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use image::DynamicImage;
use tracing::{info, warn};

use plate_vision::{config::PipelineConfig, imgio, logging, PlateReader};

#[derive(Parser)]
#[command(
    name = "plate-vision",
    version,
    about = "Locate and read vehicle license plates in a still image"
)]
struct Cli {
    /// Image file containing one or more license plates.
    input: PathBuf,

    /// TOML file with pipeline tunables.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TTF/OTF font for OCR templates; overrides the config value.
    #[arg(short, long)]
    font: Option<PathBuf>,

    /// Write an annotated copy of the input here.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump segmented characters as PNGs into this directory.
    #[arg(long)]
    segments_dir: Option<PathBuf>,

    /// Dump letterboxed plate previews into this directory.
    #[arg(long)]
    preview_dir: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(font) = &cli.font {
        config.ocr.font_path = Some(font.clone());
    }

    let reader = PlateReader::new(config).context("building plate reader")?;
    let image = imgio::load_image(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;

    let readings = reader.read(&image);
    if readings.is_empty() {
        warn!("no plates found");
    }
    for (index, reading) in readings.iter().enumerate() {
        println!(
            "plate {}: {:?} (confidence {:.3}) at {},{} {}x{}",
            index,
            reading.text,
            reading.confidence,
            reading.bbox.left(),
            reading.bbox.top(),
            reading.bbox.width(),
            reading.bbox.height(),
        );
    }

    if let Some(output) = &cli.output {
        let annotated = reader.annotate(&image, &readings);
        let path = imgio::save_image(&DynamicImage::ImageRgb8(annotated), output)?;
        info!(path = %path.display(), "wrote annotated image");
    }

    if let Some(dir) = &cli.segments_dir {
        for (index, reading) in readings.iter().enumerate() {
            let paths = imgio::save_segments(&reading.chars, dir.join(format!("plate_{index}")))?;
            info!(plate = index, segments = paths.len(), "wrote segments");
        }
    }

    if let Some(dir) = &cli.preview_dir {
        imgio::ensure_dir(dir)?;
        for (index, reading) in readings.iter().enumerate() {
            let preview = imgio::letterbox(
                &DynamicImage::ImageRgb8(reading.plate.clone()),
                imgio::PREVIEW_WIDTH,
                imgio::PREVIEW_HEIGHT,
            );
            let path = dir.join(format!("plate_{index}.png"));
            imgio::save_image(&DynamicImage::ImageRgb8(preview), &path)?;
            info!(path = %path.display(), "wrote plate preview");
        }
    }

    Ok(())
}
