use image::imageops;
use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{otsu_level, threshold};
use imageproc::rect::Rect;

use crate::config::SegmentConfig;

/// Otsu threshold, inverted so the glyph strokes are foreground.
pub fn binarize(plate: &RgbImage) -> GrayImage {
    let gray = DynamicImage::ImageRgb8(plate.clone()).to_luma8();
    let mut binary = threshold(&gray, otsu_level(&gray));
    imageops::invert(&mut binary);
    binary
}

/// Bounding boxes of glyph-shaped blobs, left to right. A box qualifies
/// when it spans enough of the plate height and is taller than wide.
pub fn char_regions(binary: &GrayImage, config: &SegmentConfig) -> Vec<Rect> {
    let plate_height = binary.height() as f32;
    let mut regions: Vec<Rect> = find_contours::<i32>(binary)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer)
        .filter_map(|contour| {
            let min_x = contour.points.iter().map(|p| p.x).min()?;
            let min_y = contour.points.iter().map(|p| p.y).min()?;
            let max_x = contour.points.iter().map(|p| p.x).max()?;
            let max_y = contour.points.iter().map(|p| p.y).max()?;
            let width = (max_x - min_x + 1) as u32;
            let height = (max_y - min_y + 1) as u32;
            Some(Rect::at(min_x, min_y).of_size(width, height))
        })
        .filter(|rect| {
            let aspect = rect.width() as f32 / rect.height() as f32;
            rect.height() as f32 / plate_height > config.min_height_ratio
                && aspect > config.min_aspect
                && aspect < config.max_aspect
        })
        .collect();
    regions.sort_by_key(|rect| rect.left());
    regions
}

/// Crops of the binarized plate for each glyph region, in reading order.
pub fn segment_characters(plate: &RgbImage, config: &SegmentConfig) -> Vec<GrayImage> {
    let binary = binarize(plate);
    char_regions(&binary, config)
        .into_iter()
        .map(|rect| {
            imageops::crop_imm(
                &binary,
                rect.left() as u32,
                rect.top() as u32,
                rect.width(),
                rect.height(),
            )
            .to_image()
        })
        .collect()
}
