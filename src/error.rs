use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PixelizeError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("image {} has no pixels", path.display())]
    EmptyImage { path: PathBuf },

    #[error("palette size must be at least 1, got {0}")]
    InvalidPaletteSize(usize),

    #[error("pixel size must be at least 1, got {0}")]
    InvalidPixelSize(u32),

    #[error("palette extraction failed: {0}")]
    Extraction(String),
}
