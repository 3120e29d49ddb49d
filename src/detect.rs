use image::imageops;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use imageproc::rect::Rect;
use tracing::debug;

use crate::config::DetectionConfig;
use crate::error::{PlateError, Result};

/// External contours of the edge map whose fitted rectangle looks like a
/// plate: elongated, but not a thin sliver, and large enough to hold text.
pub fn find_plate_contours(edges: &GrayImage, config: &DetectionConfig) -> Vec<Contour<i32>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer)
        .filter(|contour| {
            if contour.points.len() < 4 {
                return false;
            }
            let corners = min_area_rect(&contour.points);
            let (width, height) = rect_sides(&corners);
            if width == 0.0 || height == 0.0 {
                return false;
            }
            let aspect = width.max(height) / width.min(height);
            let area = width * height;
            aspect > config.min_aspect && aspect < config.max_aspect && area > config.min_area
        })
        .collect()
}

/// Warp the minimum-area rectangle around `contour` onto an axis-aligned
/// canvas. Plates that come out taller than wide are rotated a quarter
/// turn clockwise. Returns the rectified plate and the axis-aligned
/// bounding box of the rectangle in source coordinates.
pub fn extract_plate(image: &RgbImage, contour: &Contour<i32>) -> Result<(RgbImage, Rect)> {
    let corners = min_area_rect(&contour.points);
    let [tl, tr, br, bl] = order_corners(&corners);

    let width = distance(tl, tr).round() as u32;
    let height = distance(tr, br).round() as u32;
    if width == 0 || height == 0 {
        return Err(PlateError::DegenerateRegion { width, height });
    }

    let src = [tl, tr, br, bl];
    let dst = [
        (0.0, 0.0),
        (width as f32 - 1.0, 0.0),
        (width as f32 - 1.0, height as f32 - 1.0),
        (0.0, height as f32 - 1.0),
    ];
    let projection = Projection::from_control_points(src, dst)
        .ok_or(PlateError::DegenerateRegion { width, height })?;

    let mut warped = RgbImage::new(width, height);
    warp_into(
        image,
        &projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut warped,
    );
    if height > width {
        warped = imageops::rotate90(&warped);
    }

    Ok((warped, bounding_rect(&corners)))
}

/// Maps `extract_plate` over the candidates, dropping the ones that fail.
pub fn extract_all_plates(
    image: &RgbImage,
    contours: &[Contour<i32>],
) -> Vec<(RgbImage, Rect)> {
    contours
        .iter()
        .filter_map(|contour| match extract_plate(image, contour) {
            Ok(plate) => Some(plate),
            Err(e) => {
                debug!("skipping candidate: {e}");
                None
            }
        })
        .collect()
}

/// Side lengths of an oriented rectangle given as four corners.
fn rect_sides(corners: &[Point<i32>; 4]) -> (f32, f32) {
    let [tl, tr, br, _] = order_corners(corners);
    (distance(tl, tr), distance(tr, br))
}

/// Order corners as top-left, top-right, bottom-right, bottom-left. The
/// top-left corner minimizes x + y, the bottom-right maximizes it, and
/// y - x separates the other two.
fn order_corners(corners: &[Point<i32>; 4]) -> [(f32, f32); 4] {
    let pts = corners.map(|p| (p.x as f32, p.y as f32));
    let sum = |p: (f32, f32)| p.0 + p.1;
    let diff = |p: (f32, f32)| p.1 - p.0;

    let mut tl = pts[0];
    let mut tr = pts[0];
    let mut br = pts[0];
    let mut bl = pts[0];
    for &p in &pts[1..] {
        if sum(p) < sum(tl) {
            tl = p;
        }
        if sum(p) > sum(br) {
            br = p;
        }
        if diff(p) < diff(tr) {
            tr = p;
        }
        if diff(p) > diff(bl) {
            bl = p;
        }
    }
    [tl, tr, br, bl]
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn bounding_rect(corners: &[Point<i32>; 4]) -> Rect {
    let min_x = corners.iter().map(|p| p.x).min().unwrap_or(0);
    let min_y = corners.iter().map(|p| p.y).min().unwrap_or(0);
    let max_x = corners.iter().map(|p| p.x).max().unwrap_or(0);
    let max_y = corners.iter().map(|p| p.y).max().unwrap_or(0);
    let width = (max_x - min_x + 1).max(1) as u32;
    let height = (max_y - min_y + 1).max(1) as u32;
    Rect::at(min_x, min_y).of_size(width, height)
}

#[cfg(test)]
mod tests {
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;

    use super::*;

    fn scene_with_rect(x: i32, y: i32, w: u32, h: u32) -> GrayImage {
        let mut scene = GrayImage::new(320, 160);
        let rect = Rect::at(x, y).of_size(w, h);
        draw_filled_rect_mut(&mut scene, rect, Luma([255u8]));
        scene
    }

    #[test]
    fn elongated_rect_passes_the_gate() {
        let scene = scene_with_rect(40, 50, 120, 40);
        let contours = find_plate_contours(&scene, &DetectionConfig::default());
        assert_eq!(contours.len(), 1);
    }

    #[test]
    fn square_blob_is_rejected() {
        let scene = scene_with_rect(40, 40, 60, 60);
        let contours = find_plate_contours(&scene, &DetectionConfig::default());
        assert!(contours.is_empty());
    }

    #[test]
    fn tiny_blob_is_rejected() {
        let scene = scene_with_rect(40, 40, 30, 10);
        let contours = find_plate_contours(&scene, &DetectionConfig::default());
        assert!(contours.is_empty());
    }

    #[test]
    fn extract_recovers_rect_dimensions() {
        let scene = scene_with_rect(40, 50, 120, 40);
        let contours = find_plate_contours(&scene, &DetectionConfig::default());
        let color = RgbImage::new(320, 160);
        let (plate, bbox) = extract_plate(&color, &contours[0]).unwrap();
        let (w, h) = plate.dimensions();
        assert!((w as i32 - 120).abs() <= 2, "width {w}");
        assert!((h as i32 - 40).abs() <= 2, "height {h}");
        assert!((bbox.left() - 40).abs() <= 2);
        assert!((bbox.top() - 50).abs() <= 2);
    }

    #[test]
    fn corner_ordering_is_stable() {
        let corners = [
            Point::new(100, 10),
            Point::new(10, 10),
            Point::new(10, 40),
            Point::new(100, 40),
        ];
        let [tl, tr, br, bl] = order_corners(&corners);
        assert_eq!(tl, (10.0, 10.0));
        assert_eq!(tr, (100.0, 10.0));
        assert_eq!(br, (100.0, 40.0));
        assert_eq!(bl, (10.0, 40.0));
    }
}
