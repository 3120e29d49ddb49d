use std::env::args;
use std::error::Error;
use std::fs;
use std::process;
use std::time::SystemTime;

use plate_vision::config::PipelineConfig;
use plate_vision::PlateReader;

const MAX_IMAGES: usize = 150;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = args();
    args.next();
    let (font, dir) = match (args.next(), args.next()) {
        (Some(font), Some(dir)) => (font, dir),
        _ => {
            eprintln!("usage: recognize_dir <font.ttf> <image directory>");
            process::exit(1);
        }
    };

    let mut config = PipelineConfig::default();
    config.ocr.font_path = Some(font.into());
    let reader = PlateReader::new(config)?;

    let mut speeds = Vec::new();
    let mut scores = Vec::new();
    let mut total_amount = 0;
    let mut success = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_image = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("jpg") | Some("jpeg") | Some("png")
        );
        if !is_image {
            continue;
        }

        let before = SystemTime::now();
        let image = image::open(&path)?;
        let readings = reader.read(&image);
        let speed = before.elapsed()?.as_millis();
        total_amount += 1;

        let texts: Vec<&str> = readings.iter().map(|r| r.text.as_str()).collect();
        println!("file: {:?}, res: {:?}, speed: {}ms", path, texts, speed);
        if let Some(first) = readings.iter().find(|r| !r.text.is_empty()) {
            scores.push(first.confidence);
            speeds.push(speed);
            success += 1;
        }
        if total_amount == MAX_IMAGES {
            break;
        }
    }

    let average_score = scores.iter().sum::<f32>() / scores.len().max(1) as f32;
    let average_speed = speeds.iter().sum::<u128>() / speeds.len().max(1) as u128;
    println!(
        "total_amount: {total_amount}, success: {success}, \
         average_score: {average_score}, average_speed: {average_speed}ms"
    );
    Ok(())
}
