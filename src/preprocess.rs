use image::imageops;
use image::{DynamicImage, GrayImage};
use imageproc::contrast::adaptive_threshold;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, open};

use crate::config::PreprocessConfig;

pub fn to_gray(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

pub fn denoise(gray: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(gray, sigma)
}

/// Local-mean threshold, inverted so dark features (plate characters,
/// frame shadows) become foreground.
pub fn binarize_adaptive(gray: &GrayImage, block_radius: u32) -> GrayImage {
    let mut binary = adaptive_threshold(gray, block_radius);
    imageops::invert(&mut binary);
    binary
}

/// Open to drop speckle noise, then close to reconnect broken strokes.
pub fn morph_filter(binary: &GrayImage, radius: u8) -> GrayImage {
    let opened = open(binary, Norm::LInf, radius);
    close(&opened, Norm::LInf, radius)
}

pub fn edge_map(binary: &GrayImage, low: f32, high: f32) -> GrayImage {
    canny(binary, low, high)
}

/// The full chain: gray, blur, adaptive threshold, morphology, Canny.
pub fn preprocess(image: &DynamicImage, config: &PreprocessConfig) -> GrayImage {
    let gray = to_gray(image);
    let blurred = denoise(&gray, config.blur_sigma);
    let binary = binarize_adaptive(&blurred, config.block_radius);
    let morphed = morph_filter(&binary, config.morph_radius);
    edge_map(&morphed, config.canny_low, config.canny_high)
}
