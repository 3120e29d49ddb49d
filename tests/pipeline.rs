//! End-to-end run over a synthetic street scene: a bright plate with
//! dark bar glyphs on a dark background, recognized against a
//! single-template engine.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use plate_vision::{OcrEngine, PipelineConfig, PlateReader};

fn plate_rect() -> Rect {
    Rect::at(80, 60).of_size(240, 80)
}

fn synthetic_scene() -> DynamicImage {
    let mut scene = RgbImage::from_pixel(400, 200, Rgb([40, 40, 40]));
    draw_filled_rect_mut(&mut scene, plate_rect(), Rgb([255, 255, 255]));
    // Four bar glyphs, shaped to pass the segmentation gate but not the
    // plate gate.
    for &x in &[110, 160, 210, 260] {
        draw_filled_rect_mut(&mut scene, Rect::at(x, 76).of_size(28, 48), Rgb([0, 0, 0]));
    }
    DynamicImage::ImageRgb8(scene)
}

fn bar_engine() -> OcrEngine {
    OcrEngine::from_templates(vec![('I', GrayImage::from_pixel(16, 32, Luma([255u8])))])
        .unwrap()
}

/// An engine whose only template is a hollow box, so the solid bar
/// glyphs in the scene match it weakly (around 0.7).
fn hollow_engine() -> OcrEngine {
    let template = GrayImage::from_fn(16, 32, |x, y| {
        if x < 3 || y < 3 || x >= 13 || y >= 29 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    OcrEngine::from_templates(vec![('O', template)]).unwrap()
}

fn overlaps_plate(bbox: &Rect) -> bool {
    let plate = plate_rect();
    bbox.left() < plate.left() + plate.width() as i32
        && bbox.left() + bbox.width() as i32 > plate.left()
        && bbox.top() < plate.top() + plate.height() as i32
        && bbox.top() + bbox.height() as i32 > plate.top()
}

#[test]
fn reads_plate_from_synthetic_scene() {
    let reader = PlateReader::with_engine(PipelineConfig::default(), bar_engine()).unwrap();
    let readings = reader.read(&synthetic_scene());

    assert!(!readings.is_empty(), "expected at least one plate reading");
    let best = readings
        .iter()
        .max_by_key(|r| r.chars.len())
        .unwrap();
    assert!(overlaps_plate(&best.bbox), "bbox {:?}", best.bbox);
    assert!(
        best.chars.len() >= 3,
        "expected most glyphs segmented, got {}",
        best.chars.len()
    );
    assert!(best.text.chars().all(|c| c == 'I'), "text {:?}", best.text);
    assert!(best.confidence > 0.5, "confidence {}", best.confidence);
}

#[test]
fn detect_finds_the_plate_region() {
    let reader = PlateReader::with_engine(PipelineConfig::default(), bar_engine()).unwrap();
    let plates = reader.detect(&synthetic_scene());

    assert!(!plates.is_empty());
    let (plate, bbox) = &plates[0];
    assert!(overlaps_plate(bbox), "bbox {bbox:?}");
    let (w, h) = plate.dimensions();
    assert!(w > h, "rectified plate should be wider than tall ({w}x{h})");
    // The fitted rectangle may pick up a few pixels of threshold band
    // around the plate, but not more than the local-mean window.
    assert!((w as i32 - 240).abs() <= 30, "width {w}");
    assert!((h as i32 - 80).abs() <= 30, "height {h}");
}

#[test]
fn injected_engine_honors_config_min_score() {
    let mut strict = PipelineConfig::default();
    strict.ocr.min_score = 0.9;
    let reader = PlateReader::with_engine(strict, hollow_engine()).unwrap();
    let readings = reader.read(&synthetic_scene());
    assert!(!readings.is_empty());
    assert!(
        readings.iter().all(|r| r.text.is_empty()),
        "weak matches should be dropped, got {:?}",
        readings.iter().map(|r| r.text.as_str()).collect::<Vec<_>>()
    );

    // The default 0.35 threshold keeps the same weak matches.
    let reader = PlateReader::with_engine(PipelineConfig::default(), hollow_engine()).unwrap();
    let readings = reader.read(&synthetic_scene());
    assert!(readings.iter().any(|r| !r.text.is_empty()));
}

#[test]
fn annotate_marks_the_reading() {
    let reader = PlateReader::with_engine(PipelineConfig::default(), bar_engine()).unwrap();
    let scene = synthetic_scene();
    let readings = reader.read(&scene);
    assert!(!readings.is_empty());

    let annotated = reader.annotate(&scene, &readings);
    let bbox = readings[0].bbox;
    let corner = annotated.get_pixel(bbox.left() as u32, bbox.top() as u32);
    assert_eq!(*corner, Rgb([255, 0, 0]));
}
