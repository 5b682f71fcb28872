use std::path::Path;

use image::RgbImage;

use crate::color::Color;
use crate::error::PixelizeError;

/// Color space used to cluster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    Lab,
    Rgb,
}

/// Source of the representative colors a palette is built from.
pub trait PaletteExtractor {
    /// Returns at most `count` colors, most representative first.
    fn extract_palette(&self, path: &Path, count: usize) -> Result<Vec<Color>, PixelizeError>;
}

impl<E: PaletteExtractor + ?Sized> PaletteExtractor for Box<E> {
    fn extract_palette(&self, path: &Path, count: usize) -> Result<Vec<Color>, PixelizeError> {
        (**self).extract_palette(path, count)
    }
}

/// Ignores the image and hands back preset colors.
#[derive(Debug, Clone, Default)]
pub struct FixedPalette {
    colors: Vec<Color>,
}

impl FixedPalette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }
}

impl PaletteExtractor for FixedPalette {
    fn extract_palette(&self, _path: &Path, count: usize) -> Result<Vec<Color>, PixelizeError> {
        Ok(self.colors.iter().take(count).copied().collect())
    }
}

/// Opens `path` as 8-bit RGB, rejecting images without pixels.
pub(crate) fn load_rgb(path: &Path) -> Result<RgbImage, PixelizeError> {
    let img = image::open(path)?.to_rgb8();
    if img.width() == 0 || img.height() == 0 {
        return Err(PixelizeError::EmptyImage { path: path.to_path_buf() });
    }
    Ok(img)
}

/// Orders cluster ids by how many pixels they hold, largest first; ties keep id order.
pub(crate) fn order_by_population(indices: &[u8], num_clusters: usize) -> Vec<usize> {
    let mut population = vec![0usize; num_clusters];
    for &idx in indices {
        if let Some(count) = population.get_mut(idx as usize) {
            *count += 1;
        }
    }
    let mut order: Vec<usize> = (0..num_clusters).filter(|&k| population[k] > 0).collect();
    order.sort_by(|a, b| population[*b].cmp(&population[*a]));
    order
}

pub mod kmeans_extractor;
pub mod median_cut;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_palette_truncates_to_count() {
        let extractor = FixedPalette::new(vec![
            Color::BLACK,
            Color::new(1.0, 1.0, 1.0),
            Color::new(2.0, 2.0, 2.0),
        ]);
        let colors = extractor.extract_palette(Path::new("ignored.png"), 2).unwrap();
        assert_eq!(colors, vec![Color::BLACK, Color::new(1.0, 1.0, 1.0)]);
    }

    #[test]
    fn population_order_is_descending_and_skips_empty_clusters() {
        let indices = [2, 0, 2, 2, 0, 3];
        assert_eq!(order_by_population(&indices, 4), vec![2, 0, 3]);
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = load_rgb(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, PixelizeError::Image(_)));
    }
}
