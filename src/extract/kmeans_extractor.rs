use std::collections::HashSet;
use std::path::Path;

use image::RgbImage;
use kmeans_colors::{get_kmeans, Calculate, Kmeans};
use log::{debug, warn};
use palette::{FromColor, IntoColor, Lab, Srgb};

use super::{load_rgb, order_by_population, ColorType, PaletteExtractor};
use crate::color::Color;
use crate::error::PixelizeError;

// indices are stored as u8
const MAX_CLUSTERS: usize = u8::MAX as usize + 1;

/// Dominant colors from k-means clustering, ordered by cluster population.
pub struct KmeansExtractor {
    num_runs: u32,
    max_iter: usize,
    color_type: ColorType,
    seed: u64,
}

impl KmeansExtractor {
    pub fn new(num_runs: u32, max_iter: usize, color_type: ColorType) -> Self {
        Self {
            num_runs: num_runs.max(1),
            max_iter,
            color_type,
            seed: 42,
        }
    }

    /// Keeps the lowest-score result over `num_runs` seeded runs.
    fn best_of_runs<C: Calculate + Clone>(
        &self,
        buf: &[C],
        num_colors: usize,
        converge: f32,
    ) -> Kmeans<C> {
        let mut result = Kmeans::<C>::new();
        for run in 0..self.num_runs {
            let seed = self.seed + run as u64;
            let run_result = get_kmeans(num_colors, self.max_iter, converge, false, buf, seed);
            debug!("k-means run {} score {}", run, run_result.score);
            if run_result.score < result.score {
                result = run_result;
            }
        }
        result
    }
}

impl Default for KmeansExtractor {
    fn default() -> Self {
        Self::new(3, 20, ColorType::Lab)
    }
}

fn get_lab_vec(rgb_image: &RgbImage) -> Vec<Lab> {
    rgb_image
        .pixels()
        .map(|pixel| {
            let rgb_color = Srgb::new(
                pixel[0] as f32 / 255.0,
                pixel[1] as f32 / 255.0,
                pixel[2] as f32 / 255.0,
            )
            .into_linear();
            let lab_color: Lab = rgb_color.into_color();
            lab_color
        })
        .collect()
}

fn get_rgb_vec(rgb_image: &RgbImage) -> Vec<Srgb> {
    rgb_image
        .pixels()
        .map(|pixel| Srgb::new(pixel[0], pixel[1], pixel[2]).into_format())
        .collect()
}

fn dominant_first<C: Calculate + Copy>(
    result: &Kmeans<C>,
    to_color: impl Fn(C) -> Color,
) -> Vec<Color> {
    order_by_population(&result.indices, result.centroids.len())
        .into_iter()
        .map(|k| to_color(result.centroids[k]))
        .collect()
}

impl PaletteExtractor for KmeansExtractor {
    fn extract_palette(&self, path: &Path, count: usize) -> Result<Vec<Color>, PixelizeError> {
        if count == 0 {
            return Err(PixelizeError::InvalidPaletteSize(count));
        }
        let rgb_image = load_rgb(path)?;
        // seeding cannot pick more distinct centroids than there are distinct pixels
        let distinct = rgb_image.pixels().map(|p| p.0).collect::<HashSet<_>>().len();
        let num_colors = count.min(distinct).min(MAX_CLUSTERS);
        if num_colors < count {
            warn!("Requested {} colors, clustering into {} instead", count, num_colors);
        }

        let colors = match self.color_type {
            ColorType::Lab => {
                let lab_vec = get_lab_vec(&rgb_image);
                let result = self.best_of_runs(&lab_vec, num_colors, 5.0);
                dominant_first(&result, |lab| {
                    Srgb::<f32>::from_color(lab).into_format::<u8>().into()
                })
            }
            ColorType::Rgb => {
                let rgb_vec = get_rgb_vec(&rgb_image);
                let result = self.best_of_runs(&rgb_vec, num_colors, 0.0025);
                dominant_first(&result, |rgb| rgb.into_format::<u8>().into())
            }
        };
        if colors.is_empty() {
            return Err(PixelizeError::Extraction(format!(
                "k-means found no clusters in {}",
                path.display()
            )));
        }
        Ok(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn two_tone(dir: &Path) -> std::path::PathBuf {
        // 3/4 red on top, 1/4 blue at the bottom
        let img = RgbImage::from_fn(8, 8, |_, y| {
            if y < 6 { Rgb([220, 20, 20]) } else { Rgb([20, 20, 220]) }
        });
        let path = dir.join("two_tone.png");
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn dominant_cluster_comes_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = two_tone(dir.path());
        for color_type in [ColorType::Lab, ColorType::Rgb] {
            let extractor = KmeansExtractor::new(2, 20, color_type);
            let colors = extractor.extract_palette(&path, 2).unwrap();
            assert_eq!(colors.len(), 2);
            assert!(colors[0].r > colors[0].b, "{:?}: {:?}", color_type, colors);
            assert!(colors[1].b > colors[1].r, "{:?}: {:?}", color_type, colors);
        }
    }

    #[test]
    fn zero_colors_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = two_tone(dir.path());
        let err = KmeansExtractor::default().extract_palette(&path, 0).unwrap_err();
        assert!(matches!(err, PixelizeError::InvalidPaletteSize(0)));
    }

    #[test]
    fn never_returns_more_than_requested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.png");
        RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 128]))
            .save(&path)
            .unwrap();
        let colors = KmeansExtractor::default().extract_palette(&path, 5).unwrap();
        assert!(!colors.is_empty() && colors.len() <= 5);
    }

    #[test]
    fn uniform_image_yields_a_single_color() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uniform.png");
        RgbImage::from_pixel(6, 6, Rgb([40, 90, 160])).save(&path).unwrap();
        let colors = KmeansExtractor::new(1, 20, ColorType::Rgb).extract_palette(&path, 4).unwrap();
        assert_eq!(colors, vec![Color::new(40.0, 90.0, 160.0)]);
    }
}
