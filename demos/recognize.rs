use std::env::args;
use std::error::Error;
use std::process;
use std::time::SystemTime;

use plate_vision::config::PipelineConfig;
use plate_vision::PlateReader;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = args();
    args.next();
    let (font, path) = match (args.next(), args.next()) {
        (Some(font), Some(path)) => (font, path),
        _ => {
            eprintln!("usage: recognize <font.ttf> <image>");
            process::exit(1);
        }
    };

    let mut config = PipelineConfig::default();
    config.ocr.font_path = Some(font.into());
    let reader = PlateReader::new(config)?;

    let image = image::open(path)?;
    let before = SystemTime::now();
    let readings = reader.read(&image);
    let elapsed = before.elapsed()?.as_millis();

    for reading in &readings {
        println!(
            "res: {:?} ({:.3}), speed: {}ms",
            reading.text, reading.confidence, elapsed
        );
    }
    if readings.is_empty() {
        println!("no plates found, speed: {elapsed}ms");
    }
    Ok(())
}
