use std::path::{Path, PathBuf};

use image::RgbImage;
use log::info;

use crate::brightness_palette::build_palette;
use crate::config::PipelineConfig;
use crate::error::PixelizeError;
use crate::extract::PaletteExtractor;
use crate::pixelizer::block_pixelizer::pixelize;

/// `<stem>_pixelized.png` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let file_stem = input.file_stem().unwrap_or_default();
    let mut new_name = file_stem.to_os_string();
    new_name.push("_pixelized.png");
    input.with_file_name(new_name)
}

/// Loads `input`, builds the palette from `palette_source`, pixelizes and saves to `output`.
pub fn run(
    input: &Path,
    palette_source: &Path,
    output: &Path,
    config: &PipelineConfig,
) -> Result<RgbImage, PixelizeError> {
    let extractor = config.method.extractor();
    run_with(&extractor, input, palette_source, output, config)
}

/// Same as [`run`] with an explicit palette extractor.
pub fn run_with<E: PaletteExtractor + ?Sized>(
    extractor: &E,
    input: &Path,
    palette_source: &Path,
    output: &Path,
    config: &PipelineConfig,
) -> Result<RgbImage, PixelizeError> {
    info!("Using input file: {}", input.display());
    let img = image::open(input)?.to_rgb8();

    info!(
        "Extracting {} colors from {}",
        config.palette_size,
        palette_source.display()
    );
    let palette = build_palette(extractor, palette_source, config.palette_size.get())?;

    let pixelized = pixelize(&img, &palette, config.pixel_size);
    info!(
        "Pixelized {}x{} into {}x{} with {} palette colors",
        img.width(),
        img.height(),
        pixelized.width(),
        pixelized.height(),
        palette.len()
    );

    pixelized.save(output)?;
    info!("Saved to {}", output.display());
    Ok(pixelized)
}
