use std::fs;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::template_matching::{match_template, MatchTemplateMethod};
use rusttype::{point, Font, Scale};
use tracing::{debug, trace};

use crate::error::{PlateError, Result};

/// A single glyph reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharMatch {
    pub ch: char,
    pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug)]
struct GlyphTemplate {
    ch: char,
    image: GrayImage,
}

/// Template-matching recognizer. Each charset character is rasterized
/// from a font into a fixed-size white-on-black template; candidate
/// glyphs are resized to the same raster and scored by normalized
/// cross-correlation.
#[derive(Debug)]
pub struct OcrEngine {
    templates: Vec<GlyphTemplate>,
    width: u32,
    height: u32,
    min_score: f32,
}

impl OcrEngine {
    pub fn from_font_file(
        path: impl AsRef<Path>,
        charset: &str,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        let font = Font::try_from_vec(data).ok_or_else(|| PlateError::InvalidFont {
            path: path.as_ref().to_path_buf(),
        })?;
        Self::from_font(&font, charset, width, height)
    }

    pub fn from_font(font: &Font<'_>, charset: &str, width: u32, height: u32) -> Result<Self> {
        let scale = Scale::uniform(height as f32);
        let mut templates = Vec::new();
        for ch in charset.chars() {
            match rasterize_glyph(font, ch, scale) {
                Some(raster) => {
                    let image = imageops::resize(&raster, width, height, FilterType::CatmullRom);
                    templates.push(GlyphTemplate { ch, image });
                }
                None => debug!(%ch, "font has no outline for character, skipping"),
            }
        }
        if templates.is_empty() {
            return Err(PlateError::EmptyCharset {
                charset: charset.to_string(),
            });
        }
        Ok(Self {
            templates,
            width,
            height,
            min_score: 0.0,
        })
    }

    /// Build an engine from prepared templates. All templates must share
    /// the same dimensions.
    pub fn from_templates(templates: Vec<(char, GrayImage)>) -> Result<Self> {
        let (width, height) = match templates.first() {
            Some((_, image)) => image.dimensions(),
            None => {
                return Err(PlateError::EmptyCharset {
                    charset: String::new(),
                })
            }
        };
        if templates.iter().any(|(_, t)| t.dimensions() != (width, height)) {
            return Err(PlateError::config("ocr templates must share dimensions"));
        }
        let templates = templates
            .into_iter()
            .map(|(ch, image)| GlyphTemplate { ch, image })
            .collect();
        Ok(Self {
            templates,
            width,
            height,
            min_score: 0.0,
        })
    }

    /// Matches scoring below this are dropped from [`OcrEngine::recognize`].
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Score every template against the candidate glyph and keep the best.
    pub fn recognize_char(&self, glyph: &GrayImage) -> Option<CharMatch> {
        let resized = imageops::resize(glyph, self.width, self.height, FilterType::CatmullRom);
        self.templates
            .iter()
            .map(|template| {
                let scores = match_template(
                    &resized,
                    &template.image,
                    MatchTemplateMethod::CrossCorrelationNormalized,
                );
                let score = scores.get_pixel(0, 0)[0];
                let score = if score.is_finite() { score } else { 0.0 };
                trace!(ch = %template.ch, score, "template score");
                CharMatch {
                    ch: template.ch,
                    score,
                }
            })
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// Read a glyph sequence left to right. Confidence is the mean score
    /// of the accepted characters.
    pub fn recognize(&self, glyphs: &[GrayImage]) -> OcrResult {
        let matches: Vec<CharMatch> = glyphs
            .iter()
            .filter_map(|glyph| self.recognize_char(glyph))
            .filter(|m| m.score >= self.min_score)
            .collect();
        if matches.is_empty() {
            return OcrResult::default();
        }
        let text: String = matches.iter().map(|m| m.ch).collect();
        let confidence = matches.iter().map(|m| m.score).sum::<f32>() / matches.len() as f32;
        OcrResult { text, confidence }
    }
}

/// Rasterize one character into its tight bounding box, white on black.
/// Returns None when the font has no outline for it.
fn rasterize_glyph(font: &Font<'_>, ch: char, scale: Scale) -> Option<GrayImage> {
    let glyph = font.glyph(ch).scaled(scale).positioned(point(0.0, 0.0));
    let bb = glyph.pixel_bounding_box()?;
    let width = bb.width().max(1) as u32;
    let height = bb.height().max(1) as u32;
    let mut raster = GrayImage::new(width, height);
    glyph.draw(|x, y, v| {
        if x < width && y < height {
            raster.put_pixel(x, y, Luma([(v * 255.0) as u8]));
        }
    });
    if raster.pixels().all(|p| p[0] == 0) {
        return None;
    }
    Some(raster)
}
