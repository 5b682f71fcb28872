mod brightness_palette;
mod color;
mod config;
mod error;
mod extract;
mod pipeline;
mod pixelizer;

pub use brightness_palette::{brightness_key, build_palette, BrightnessPalette, MATCH_SENTINEL};
pub use color::{average, brightness, Color};
pub use config::{ExtractionMethod, PipelineConfig};
pub use error::PixelizeError;
pub use extract::kmeans_extractor::KmeansExtractor;
pub use extract::median_cut::MedianCutExtractor;
pub use extract::{ColorType, FixedPalette, PaletteExtractor};
pub use pipeline::{default_output_path, run, run_with};
pub use pixelizer::block_pixelizer::{pixelize, BlockPixelizer};
pub use pixelizer::{cropped_size, Pixelizer};
