use image::imageops;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::contrast::{otsu_level, threshold};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use tracing::debug;

/// Estimate the text skew from the oriented bounding rectangle of the
/// foreground pixels and rotate the plate upright. Plates with no
/// foreground come back unchanged.
pub fn deskew(plate: &RgbImage) -> RgbImage {
    let gray = DynamicImage::ImageRgb8(plate.clone()).to_luma8();
    let mut binary = threshold(&gray, otsu_level(&gray));
    imageops::invert(&mut binary);

    let foreground: Vec<Point<i32>> = binary
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0)
        .map(|(x, y, _)| Point::new(x as i32, y as i32))
        .collect();
    if foreground.len() < 4 {
        return plate.clone();
    }

    let corners = min_area_rect(&foreground);
    let angle = skew_angle(&corners);
    debug!(angle, "deskewing plate");
    if angle.abs() < 0.1 {
        return plate.clone();
    }

    rotate_about_center(
        plate,
        (-angle).to_radians(),
        Interpolation::Bicubic,
        Rgb([0, 0, 0]),
    )
}

/// Crop `ratio` of the width and height from each border. Keeps the input
/// when the crop would leave nothing.
pub fn trim_edges(plate: &RgbImage, ratio: f32) -> RgbImage {
    let (width, height) = plate.dimensions();
    let dx = (width as f32 * ratio) as u32;
    let dy = (height as f32 * ratio) as u32;
    if width <= 2 * dx || height <= 2 * dy {
        return plate.clone();
    }
    imageops::crop_imm(plate, dx, dy, width - 2 * dx, height - 2 * dy).to_image()
}

/// Angle of the rectangle's longer edge against the horizontal, in
/// degrees, normalized into [-45, 45].
fn skew_angle(corners: &[Point<i32>; 4]) -> f32 {
    let edge = |a: Point<i32>, b: Point<i32>| {
        let dx = (b.x - a.x) as f32;
        let dy = (b.y - a.y) as f32;
        (dx, dy)
    };
    let (dx1, dy1) = edge(corners[0], corners[1]);
    let (dx2, dy2) = edge(corners[1], corners[2]);
    let (dx, dy) = if dx1.hypot(dy1) >= dx2.hypot(dy2) {
        (dx1, dy1)
    } else {
        (dx2, dy2)
    };

    let mut angle = dy.atan2(dx).to_degrees();
    while angle <= -45.0 {
        angle += 90.0;
    }
    while angle > 45.0 {
        angle -= 90.0;
    }
    angle
}
