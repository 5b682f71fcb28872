use std::num::NonZeroU32;

use image::DynamicImage;

/// Width and height cut down to the nearest multiple of `pixel_size`.
///
/// Trailing columns on the right and rows at the bottom are dropped.
pub fn cropped_size(width: u32, height: u32, pixel_size: NonZeroU32) -> (u32, u32) {
    let scale = pixel_size.get();
    (width - width % scale, height - height % scale)
}

pub trait Pixelizer {
    fn pixelize(&self, img: &DynamicImage) -> DynamicImage;
}

pub mod block_pixelizer;
