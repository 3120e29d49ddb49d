//! Locates and reads vehicle license plates in still images.
//!
//! The pipeline runs in five stages: edge/contour based detection,
//! perspective correction onto an axis-aligned canvas, deskewing,
//! character segmentation, and template-based recognition. Every image
//! operation delegates to `image`/`imageproc`; this crate sequences
//! parameters and thresholds around them.

use std::fs;

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use tracing::{debug, info};

pub mod config;
pub mod detect;
pub mod error;
pub mod imgio;
pub mod logging;
pub mod ocr;
pub mod preprocess;
pub mod rectify;
pub mod segment;

pub use config::PipelineConfig;
pub use error::{PlateError, Result};
pub use ocr::OcrEngine;

/// One recognized plate.
#[derive(Debug, Clone)]
pub struct PlateReading {
    pub text: String,
    pub confidence: f32,
    /// Axis-aligned bounding box in source image coordinates.
    pub bbox: Rect,
    /// The rectified, deskewed, trimmed plate.
    pub plate: RgbImage,
    /// Segmented glyph crops in reading order.
    pub chars: Vec<GrayImage>,
}

/// Ties the pipeline stages together behind one entry point.
#[derive(Debug)]
pub struct PlateReader {
    config: PipelineConfig,
    ocr: OcrEngine,
    font: Option<Font<'static>>,
}

impl PlateReader {
    /// Build a reader from a config. Requires `ocr.font_path`; the font
    /// backs both the glyph templates and annotation labels.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let font_path = config
            .ocr
            .font_path
            .clone()
            .ok_or_else(|| PlateError::config("ocr.font_path is required"))?;
        let data = fs::read(&font_path)?;
        let font =
            Font::try_from_vec(data).ok_or(PlateError::InvalidFont { path: font_path })?;
        let ocr = OcrEngine::from_font(
            &font,
            &config.ocr.charset,
            config.ocr.template_width,
            config.ocr.template_height,
        )?
        .with_min_score(config.ocr.min_score);
        Ok(Self {
            config,
            ocr,
            font: Some(font),
        })
    }

    /// Build a reader around a prepared recognition engine. The config's
    /// `ocr.min_score` still applies; annotations will carry boxes but
    /// no text labels.
    pub fn with_engine(config: PipelineConfig, ocr: OcrEngine) -> Result<Self> {
        config.validate()?;
        let ocr = ocr.with_min_score(config.ocr.min_score);
        Ok(Self {
            config,
            ocr,
            font: None,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Locate plate candidates and rectify them, without recognition.
    pub fn detect(&self, image: &DynamicImage) -> Vec<(RgbImage, Rect)> {
        let edges = preprocess::preprocess(image, &self.config.preprocess);
        let contours = detect::find_plate_contours(&edges, &self.config.detection);
        debug!(candidates = contours.len(), "plate candidates");
        detect::extract_all_plates(&image.to_rgb8(), &contours)
    }

    /// Run the full pipeline. Candidates with no segmentable characters
    /// are dropped.
    pub fn read(&self, image: &DynamicImage) -> Vec<PlateReading> {
        let mut readings = Vec::new();
        for (plate, bbox) in self.detect(image) {
            let deskewed = rectify::deskew(&plate);
            let trimmed = rectify::trim_edges(&deskewed, self.config.rectify.trim_ratio);
            let chars = segment::segment_characters(&trimmed, &self.config.segment);
            if chars.is_empty() {
                debug!(?bbox, "no characters segmented, dropping candidate");
                continue;
            }
            let result = self.ocr.recognize(&chars);
            info!(
                text = %result.text,
                confidence = result.confidence,
                chars = chars.len(),
                "plate read"
            );
            readings.push(PlateReading {
                text: result.text,
                confidence: result.confidence,
                bbox,
                plate: trimmed,
                chars,
            });
        }
        readings
    }

    /// Draw hollow boxes and, when a font is loaded, `TEXT--confidence`
    /// labels over each reading.
    pub fn annotate(&self, image: &DynamicImage, readings: &[PlateReading]) -> RgbImage {
        let mut canvas = image.to_rgb8();
        let color = Rgb([255, 0, 0]);
        for reading in readings {
            draw_hollow_rect_mut(&mut canvas, reading.bbox, color);
            if let Some(font) = &self.font {
                let label = format!("{}--{:.2}", reading.text, reading.confidence);
                let scale = Scale::uniform(24.0);
                draw_text_mut(
                    &mut canvas,
                    color,
                    reading.bbox.left(),
                    reading.bbox.top(),
                    scale,
                    font,
                    &label,
                );
            }
        }
        canvas
    }
}
