use std::num::NonZeroU32;

use image::{DynamicImage, RgbImage};
use log::debug;

use super::{cropped_size, Pixelizer};
use crate::brightness_palette::BrightnessPalette;
use crate::color::{average, Color};

/// Replaces every `pixel_size` square with the palette color matching its average.
pub struct BlockPixelizer {
    palette: BrightnessPalette,
    pixel_size: NonZeroU32,
}

impl BlockPixelizer {
    pub fn new(palette: BrightnessPalette, pixel_size: NonZeroU32) -> Self {
        Self { palette, pixel_size }
    }
}

impl Pixelizer for BlockPixelizer {
    fn pixelize(&self, img: &DynamicImage) -> DynamicImage {
        DynamicImage::ImageRgb8(pixelize(&img.to_rgb8(), &self.palette, self.pixel_size))
    }
}

/// Pixelizes `image` into a new image cropped to a multiple of `pixel_size`.
///
/// Blocks are visited column by column (x outer, y inner) and each one is
/// filled with the palette color nearest in brightness to its average.
pub fn pixelize(image: &RgbImage, palette: &BrightnessPalette, pixel_size: NonZeroU32) -> RgbImage {
    let (w, h) = cropped_size(image.width(), image.height(), pixel_size);
    let size = pixel_size.get();
    debug!(
        "Pixelizing {}x{} (cropped from {}x{}) into {}x{} blocks of {}px",
        w,
        h,
        image.width(),
        image.height(),
        w / size,
        h / size,
        size
    );

    let mut pix_image = RgbImage::new(w, h);
    // grows on the first block; a block larger than the image never allocates
    let mut pixel_values = Vec::new();

    for i in (0..w).step_by(size as usize) {
        for j in (0..h).step_by(size as usize) {
            pixel_values.clear();
            for x in i..i + size {
                for y in j..j + size {
                    pixel_values.push(Color::from(*image.get_pixel(x, y)));
                }
            }

            let Some(block_average) = average(&pixel_values) else {
                continue;
            };
            let pixel = palette.match_color(&block_average).to_rgb8();

            for x in i..i + size {
                for y in j..j + size {
                    pix_image.put_pixel(x, y, pixel);
                }
            }
        }
    }

    pix_image
}
