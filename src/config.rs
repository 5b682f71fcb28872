use std::num::{NonZeroU32, NonZeroUsize};

use crate::error::PixelizeError;
use crate::extract::kmeans_extractor::KmeansExtractor;
use crate::extract::median_cut::MedianCutExtractor;
use crate::extract::{ColorType, PaletteExtractor};

/// How the reference palette is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Kmeans {
        num_runs: u32,
        max_iter: usize,
        color_type: ColorType,
    },
    MedianCut {
        /// Pixel sampling stride.
        quality: usize,
    },
}

impl Default for ExtractionMethod {
    fn default() -> Self {
        Self::MedianCut { quality: 10 }
    }
}

impl ExtractionMethod {
    pub fn extractor(&self) -> Box<dyn PaletteExtractor> {
        match *self {
            Self::Kmeans { num_runs, max_iter, color_type } => {
                Box::new(KmeansExtractor::new(num_runs, max_iter, color_type))
            }
            Self::MedianCut { quality } => Box::new(MedianCutExtractor::new(quality)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub palette_size: NonZeroUsize,
    pub pixel_size: NonZeroU32,
    pub method: ExtractionMethod,
}

impl PipelineConfig {
    /// Validates the raw sizes; zero is rejected for both.
    pub fn new(
        palette_size: usize,
        pixel_size: u32,
        method: ExtractionMethod,
    ) -> Result<Self, PixelizeError> {
        let palette_size = NonZeroUsize::new(palette_size)
            .ok_or(PixelizeError::InvalidPaletteSize(palette_size))?;
        let pixel_size =
            NonZeroU32::new(pixel_size).ok_or(PixelizeError::InvalidPixelSize(pixel_size))?;
        Ok(Self {
            palette_size,
            pixel_size,
            method,
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            palette_size: NonZeroUsize::new(8).unwrap_or(NonZeroUsize::MIN),
            pixel_size: NonZeroU32::new(8).unwrap_or(NonZeroU32::MIN),
            method: ExtractionMethod::default(),
        }
    }
}
