use std::path::Path;

use image::RgbImage;
use log::debug;

use super::{load_rgb, PaletteExtractor};
use crate::color::Color;
use crate::error::PixelizeError;

const SIGBITS: u32 = 5;
const RSHIFT: u32 = 8 - SIGBITS;
const HISTO_SIZE: usize = 1 << (3 * SIGBITS);
// pixels brighter than this on every channel are left out of the histogram
const WHITE_CUTOFF: u8 = 250;

/// Modified median cut over a reduced-precision color histogram.
///
/// Boxes are split until `count` exist, then each box contributes its
/// population-weighted mean, most populated box first.
pub struct MedianCutExtractor {
    /// Only every `quality`-th pixel is sampled; 1 reads them all.
    quality: usize,
}

impl MedianCutExtractor {
    pub fn new(quality: usize) -> Self {
        Self { quality: quality.max(1) }
    }
}

impl Default for MedianCutExtractor {
    fn default() -> Self {
        Self::new(10)
    }
}

/// A box of histogram entries, each a bucket center and its pixel count.
#[derive(Debug, Clone)]
struct ColorBox {
    entries: Vec<([f64; 3], f64)>,
}

impl ColorBox {
    fn new(entries: Vec<([f64; 3], f64)>) -> Self {
        Self { entries }
    }

    fn total_weight(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Range (max - min) along each channel.
    fn ranges(&self) -> [f64; 3] {
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for (rgb, _) in &self.entries {
            for axis in 0..3 {
                min[axis] = min[axis].min(rgb[axis]);
                max[axis] = max[axis].max(rgb[axis]);
            }
        }
        [max[0] - min[0], max[1] - min[1], max[2] - min[2]]
    }

    fn priority(&self) -> f64 {
        let [r, g, b] = self.ranges();
        self.total_weight() * r.max(g).max(b)
    }

    fn mean(&self) -> Color {
        let mut sums = [0.0f64; 3];
        let mut w_sum = 0.0f64;
        for (rgb, w) in &self.entries {
            for axis in 0..3 {
                sums[axis] += rgb[axis] * w;
            }
            w_sum += w;
        }
        if w_sum <= 0.0 {
            return Color::BLACK;
        }
        Color::new(
            (sums[0] / w_sum).round(),
            (sums[1] / w_sum).round(),
            (sums[2] / w_sum).round(),
        )
    }

    /// Split along the widest channel at the weighted median.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let [rr, rg, rb] = self.ranges();
        let axis = if rr >= rg && rr >= rb {
            0
        } else if rg >= rb {
            1
        } else {
            2
        };

        self.entries
            .sort_by(|a, b| a.0[axis].partial_cmp(&b.0[axis]).unwrap_or(std::cmp::Ordering::Equal));

        let half_weight = self.total_weight() / 2.0;
        let mut accumulated = 0.0f64;
        let mut split_idx = 1;
        for (i, (_, w)) in self.entries.iter().enumerate() {
            accumulated += w;
            if accumulated >= half_weight && i + 1 < self.entries.len() {
                split_idx = i + 1;
                break;
            }
        }
        split_idx = split_idx.clamp(1, self.entries.len() - 1);

        let right = self.entries.split_off(split_idx);
        (ColorBox::new(self.entries), ColorBox::new(right))
    }
}

fn histogram(img: &RgbImage, quality: usize) -> Vec<([f64; 3], f64)> {
    let mut buckets = vec![0u32; HISTO_SIZE];
    for pixel in img.pixels().step_by(quality) {
        if pixel.0.iter().all(|&c| c > WHITE_CUTOFF) {
            continue;
        }
        let [r, g, b] = pixel.0.map(|c| (c >> RSHIFT) as usize);
        buckets[(r << (2 * SIGBITS)) | (g << SIGBITS) | b] += 1;
    }

    let mask: usize = (1 << SIGBITS) - 1;
    let center = |v: usize| ((v << RSHIFT) + (1 << (RSHIFT - 1))) as f64;
    buckets
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(idx, &count)| {
            let rgb = [
                center(idx >> (2 * SIGBITS)),
                center((idx >> SIGBITS) & mask),
                center(idx & mask),
            ];
            (rgb, count as f64)
        })
        .collect()
}

fn median_cut(histogram: Vec<([f64; 3], f64)>, max_colors: usize) -> Vec<ColorBox> {
    if histogram.is_empty() {
        return Vec::new();
    }

    let mut boxes = vec![ColorBox::new(histogram)];
    while boxes.len() < max_colors {
        let best_idx = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.entries.len() >= 2)
            .max_by(|(_, a), (_, b)| {
                a.priority()
                    .partial_cmp(&b.priority())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i);

        let Some(idx) = best_idx else {
            break;
        };

        let (left, right) = boxes.swap_remove(idx).split();
        boxes.push(left);
        boxes.push(right);
    }
    boxes
}

impl PaletteExtractor for MedianCutExtractor {
    fn extract_palette(&self, path: &Path, count: usize) -> Result<Vec<Color>, PixelizeError> {
        if count == 0 {
            return Err(PixelizeError::InvalidPaletteSize(count));
        }
        let img = load_rgb(path)?;
        let hist = histogram(&img, self.quality);
        debug!("Median cut over {} occupied buckets", hist.len());

        let mut boxes = median_cut(hist, count);
        boxes.sort_by(|a, b| {
            b.total_weight()
                .partial_cmp(&a.total_weight())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(boxes.iter().map(ColorBox::mean).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn empty_histogram_gives_no_boxes() {
        assert!(median_cut(Vec::new(), 16).is_empty());
    }

    #[test]
    fn produces_requested_count() {
        let hist = (0..100).map(|i| ([i as f64 * 2.0, 0.0, 0.0], 1.0)).collect();
        assert_eq!(median_cut(hist, 8).len(), 8);
    }

    #[test]
    fn stops_when_nothing_left_to_split() {
        let hist = vec![([10.0, 10.0, 10.0], 4.0), ([200.0, 10.0, 10.0], 1.0)];
        assert_eq!(median_cut(hist, 16).len(), 2);
    }

    #[test]
    fn histogram_uses_bucket_centers() {
        let img = RgbImage::from_pixel(2, 2, Rgb([255, 0, 9]));
        let hist = histogram(&img, 1);
        assert_eq!(hist, vec![([252.0, 4.0, 12.0], 4.0)]);
    }

    #[test]
    fn near_white_pixels_are_skipped() {
        let img = RgbImage::from_fn(4, 1, |x, _| match x {
            0 => Rgb([251, 252, 255]),
            1 => Rgb([255, 255, 250]),
            _ => Rgb([0, 0, 0]),
        });
        let hist = histogram(&img, 1);
        // the first pixel is dropped, the second has a channel at exactly 250
        assert_eq!(hist, vec![([4.0, 4.0, 4.0], 2.0), ([252.0, 252.0, 252.0], 1.0)]);
    }

    #[test]
    fn all_white_image_yields_no_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("white.png");
        RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])).save(&path).unwrap();

        let colors = MedianCutExtractor::new(1).extract_palette(&path, 4).unwrap();
        assert!(colors.is_empty());
    }

    #[test]
    fn most_populated_box_comes_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mostly_green.png");
        RgbImage::from_fn(10, 10, |x, _| {
            if x < 8 { Rgb([20, 200, 20]) } else { Rgb([200, 20, 200]) }
        })
        .save(&path)
        .unwrap();

        let colors = MedianCutExtractor::new(1).extract_palette(&path, 2).unwrap();
        assert_eq!(colors.len(), 2);
        assert!(colors[0].g > colors[0].r);
        assert!(colors[1].r > colors[1].g);
    }
}
