use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlateError, Result};

/// Tunables for the whole pipeline. Every stage reads its parameters from
/// here so a TOML file can retune the reader without recompiling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub detection: DetectionConfig,
    pub rectify: RectifyConfig,
    pub segment: SegmentConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gaussian blur sigma applied before thresholding.
    pub blur_sigma: f32,
    /// Radius of the local-mean window for adaptive thresholding.
    pub block_radius: u32,
    /// Radius of the square structuring element for open/close.
    pub morph_radius: u8,
    pub canny_low: f32,
    pub canny_high: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.4,
            block_radius: 12,
            morph_radius: 1,
            canny_low: 80.0,
            canny_high: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Long side over short side of the fitted rectangle.
    pub min_aspect: f32,
    pub max_aspect: f32,
    /// Minimum rectangle area in pixels.
    pub min_area: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_aspect: 2.0,
            max_aspect: 6.5,
            min_area: 500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyConfig {
    /// Fraction of width/height cropped from each plate border.
    pub trim_ratio: f32,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        Self { trim_ratio: 0.05 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// A glyph box must be at least this fraction of the plate height.
    pub min_height_ratio: f32,
    /// Width over height bounds for a glyph box.
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_height_ratio: 0.4,
            min_aspect: 0.1,
            max_aspect: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Characters the recognizer is allowed to produce.
    pub charset: String,
    /// Font the glyph templates are rasterized from.
    pub font_path: Option<PathBuf>,
    pub template_width: u32,
    pub template_height: u32,
    /// Matches scoring below this are dropped from the reading.
    pub min_score: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            charset: "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string(),
            font_path: None,
            template_width: 32,
            template_height: 48,
            min_score: 0.35,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.preprocess.canny_low >= self.preprocess.canny_high {
            return Err(PlateError::config(
                "preprocess.canny_low must be below preprocess.canny_high",
            ));
        }
        if self.preprocess.block_radius == 0 {
            return Err(PlateError::config(
                "preprocess.block_radius must be at least 1",
            ));
        }
        if self.detection.min_aspect >= self.detection.max_aspect {
            return Err(PlateError::config(
                "detection.min_aspect must be below detection.max_aspect",
            ));
        }
        if self.detection.min_area <= 0.0 {
            return Err(PlateError::config("detection.min_area must be positive"));
        }
        if !(0.0..0.5).contains(&self.rectify.trim_ratio) {
            return Err(PlateError::config(
                "rectify.trim_ratio must be in [0, 0.5)",
            ));
        }
        if self.segment.min_aspect >= self.segment.max_aspect {
            return Err(PlateError::config(
                "segment.min_aspect must be below segment.max_aspect",
            ));
        }
        if !(0.0..1.0).contains(&self.segment.min_height_ratio) {
            return Err(PlateError::config(
                "segment.min_height_ratio must be in [0, 1)",
            ));
        }
        if self.ocr.charset.is_empty() {
            return Err(PlateError::config("ocr.charset must not be empty"));
        }
        if self.ocr.template_width == 0 || self.ocr.template_height == 0 {
            return Err(PlateError::config(
                "ocr template dimensions must be non-zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.ocr.min_score) {
            return Err(PlateError::config("ocr.min_score must be in [0, 1]"));
        }
        Ok(())
    }
}
