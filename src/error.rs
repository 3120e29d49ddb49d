use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("could not parse font data from {path:?}")]
    InvalidFont { path: PathBuf },

    #[error("degenerate plate region ({width}x{height})")]
    DegenerateRegion { width: u32, height: u32 },

    #[error("no recognizable characters in charset {charset:?}")]
    EmptyCharset { charset: String },
}

impl PlateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlateError>;
