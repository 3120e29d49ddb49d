use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage, Rgb, RgbImage};
use tracing::debug;

use crate::error::Result;

/// Display size used for plate previews.
pub const PREVIEW_WIDTH: u32 = 360;
pub const PREVIEW_HEIGHT: u32 = 240;

pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let image = image::open(path.as_ref())?;
    debug!(path = %path.as_ref().display(), "loaded image");
    Ok(image)
}

/// Save an image, creating parent directories as needed.
pub fn save_image(image: &DynamicImage, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    image.save(path)?;
    Ok(path.to_path_buf())
}

/// Dump segmented glyphs as `char_N.png` under `dir`.
pub fn save_segments(glyphs: &[GrayImage], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let (dir, _) = ensure_dir(dir)?;
    let mut paths = Vec::with_capacity(glyphs.len());
    for (index, glyph) in glyphs.iter().enumerate() {
        let path = dir.join(format!("char_{index}.png"));
        glyph.save(&path)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Aspect-preserving resize padded with white to exactly `width x height`.
pub fn letterbox(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    let scale = (width as f32 / w as f32).min(height as f32 / h as f32);
    let new_w = ((w as f32 * scale) as u32).max(1);
    let new_h = ((h as f32 * scale) as u32).max(1);
    let resized = imageops::resize(&image.to_rgb8(), new_w, new_h, FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let left = (width - new_w) / 2;
    let top = (height - new_h) / 2;
    imageops::overlay(&mut canvas, &resized, left as i64, top as i64);
    canvas
}

/// Create `path` if missing; returns the path and whether it was created.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<(PathBuf, bool)> {
    let path = path.as_ref();
    let existed = path.exists();
    fs::create_dir_all(path)?;
    Ok((path.to_path_buf(), !existed))
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, Rgb([10, 20, 30])));
        save_image(&image, &path).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (8, 4));
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image(dir.path().join("nope.png")).is_err());
    }

    #[test]
    fn segments_are_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let glyphs = vec![
            GrayImage::from_pixel(4, 8, Luma([255u8])),
            GrayImage::from_pixel(4, 8, Luma([0u8])),
        ];
        let paths = save_segments(&glyphs, dir.path().join("segments")).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("char_0.png"));
        assert!(paths[1].exists());
    }

    #[test]
    fn letterbox_pads_to_exact_size() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([0, 0, 0])));
        let boxed = letterbox(&image, PREVIEW_WIDTH, PREVIEW_HEIGHT);
        assert_eq!(boxed.dimensions(), (PREVIEW_WIDTH, PREVIEW_HEIGHT));
        // Square content in a wide frame leaves white bars on the sides.
        assert_eq!(*boxed.get_pixel(5, 120), Rgb([255, 255, 255]));
        assert_eq!(*boxed.get_pixel(180, 120), Rgb([0, 0, 0]));
    }

    #[test]
    fn ensure_dir_reports_creation() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fresh");
        let (_, created) = ensure_dir(&target).unwrap();
        assert!(created);
        let (_, created_again) = ensure_dir(&target).unwrap();
        assert!(!created_again);
    }
}
