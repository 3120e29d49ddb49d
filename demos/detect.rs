use std::env::args;
use std::error::Error;
use std::process;

use image::{DynamicImage, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;

use plate_vision::config::PipelineConfig;
use plate_vision::{detect, imgio, preprocess};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = args();
    args.next();
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: detect <image>");
            process::exit(1);
        }
    };

    let config = PipelineConfig::default();
    let image = image::open(&path)?;
    let edges = preprocess::preprocess(&image, &config.preprocess);
    let contours = detect::find_plate_contours(&edges, &config.detection);
    let rgb = image.to_rgb8();
    let plates = detect::extract_all_plates(&rgb, &contours);
    println!("{} candidate(s) in {}", plates.len(), path);

    let mut annotated = rgb;
    for (_, bbox) in &plates {
        draw_hollow_rect_mut(&mut annotated, *bbox, Rgb([255, 0, 0]));
    }
    let out = imgio::save_image(&DynamicImage::ImageRgb8(annotated), "detected.png")?;
    println!("annotated image written to {}", out.display());
    Ok(())
}
