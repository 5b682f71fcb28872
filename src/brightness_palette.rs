use std::path::Path;

use log::debug;

use crate::color::{brightness, Color};
use crate::error::PixelizeError;
use crate::extract::PaletteExtractor;

/// Largest brightness distance a palette entry may have and still be matched.
pub const MATCH_SENTINEL: f64 = 255.0;

/// Palette colors keyed by their rounded brightness.
///
/// Iteration follows first-insertion order of each key. Inserting a key that
/// is already present replaces its color but keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrightnessPalette {
    entries: Vec<(i64, Color)>,
}

fn round_key(value: f64) -> i64 {
    value.round_ties_even() as i64
}

pub fn brightness_key(color: &Color) -> i64 {
    round_key(brightness(color))
}

impl BrightnessPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every color by its rounded brightness, later colors winning collisions.
    pub fn from_colors<I: IntoIterator<Item = Color>>(colors: I) -> Self {
        let mut palette = Self::new();
        for color in colors {
            palette.insert(brightness_key(&color), color);
        }
        palette
    }

    /// Returns the color previously stored under `key`, if any.
    pub fn insert(&mut self, key: i64, color: Color) -> Option<Color> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, color)),
            None => {
                self.entries.push((key, color));
                None
            }
        }
    }

    pub fn get(&self, key: i64) -> Option<&Color> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &Color)> + '_ {
        self.entries.iter().map(|(k, c)| (*k, c))
    }

    /// Picks the palette color whose key is closest to the brightness of `color`.
    ///
    /// Only strictly smaller distances replace the current best, so the first
    /// entry wins a tie. Falls back to black when the palette is empty or every
    /// distance is at least [`MATCH_SENTINEL`].
    pub fn match_color(&self, color: &Color) -> Color {
        let input_brightness = brightness(color);
        let mut delta = MATCH_SENTINEL;
        let mut passed_color = Color::BLACK;

        for (key, candidate) in self.iter() {
            let new_delta = (key as f64 - input_brightness).abs();
            if new_delta < delta {
                delta = new_delta;
                passed_color = *candidate;
            }
        }
        passed_color
    }
}

/// Extracts `palette_size` representative colors from the reference image and
/// indexes them by brightness.
///
/// Extractors may return fewer colors than requested; two colors with the same
/// rounded brightness keep only the later one.
pub fn build_palette<E: PaletteExtractor + ?Sized>(
    extractor: &E,
    reference: &Path,
    palette_size: usize,
) -> Result<BrightnessPalette, PixelizeError> {
    let colors = extractor.extract_palette(reference, palette_size)?;
    let extracted = colors.len();
    let palette = BrightnessPalette::from_colors(colors);
    debug!(
        "Extracted {} colors from {}, {} distinct brightness keys",
        extracted,
        reference.display(),
        palette.len()
    );
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FixedPalette;

    fn grey(v: f64) -> Color {
        Color::new(v, v, v)
    }

    #[test]
    fn keys_round_half_to_even() {
        assert_eq!(round_key(49.5), 50);
        assert_eq!(round_key(50.5), 50);
        assert_eq!(round_key(51.5), 52);
        assert_eq!(round_key(51.49), 51);
    }

    #[test]
    fn later_color_wins_key_collision() {
        let first = grey(50.0);
        let second = Color::new(51.0, 49.0, 50.0);
        assert_eq!(brightness_key(&first), 50);
        assert_eq!(brightness_key(&second), 50);

        let palette = BrightnessPalette::from_colors([first, second]);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.get(50), Some(&second));
    }

    #[test]
    fn replaced_key_keeps_its_position() {
        let mut palette = BrightnessPalette::new();
        palette.insert(10, grey(10.0));
        palette.insert(20, grey(20.0));
        let previous = palette.insert(10, grey(11.0));

        assert_eq!(previous, Some(grey(10.0)));
        assert_eq!(palette.keys().collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(palette.get(10), Some(&grey(11.0)));
    }

    #[test]
    fn matches_nearest_brightness() {
        let mut palette = BrightnessPalette::new();
        palette.insert(0, grey(0.0));
        palette.insert(100, grey(100.0));
        palette.insert(200, grey(200.0));

        let input = grey(105.0);
        assert!((brightness(&input) - 105.0).abs() < 1e-6);
        assert_eq!(palette.match_color(&input), grey(100.0));
    }

    #[test]
    fn first_entry_wins_a_tie() {
        let mut palette = BrightnessPalette::new();
        palette.insert(-5, Color::new(1.0, 2.0, 3.0));
        palette.insert(5, Color::new(4.0, 5.0, 6.0));

        assert_eq!(palette.match_color(&Color::BLACK), Color::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn falls_back_to_black_beyond_sentinel() {
        let mut palette = BrightnessPalette::new();
        palette.insert(0, Color::new(10.0, 20.0, 30.0));

        // brightness 300, so the only delta is 300 >= 255
        assert_eq!(palette.match_color(&grey(300.0)), Color::BLACK);

        let mut far = BrightnessPalette::new();
        far.insert(500, grey(250.0));
        assert_eq!(far.match_color(&Color::BLACK), Color::BLACK);
    }

    #[test]
    fn delta_of_exactly_255_falls_back_to_black() {
        let white = grey(255.0);
        let palette = BrightnessPalette::from_colors([white]);
        assert_eq!(palette.keys().collect::<Vec<_>>(), vec![255]);

        assert_eq!(palette.match_color(&Color::BLACK), Color::BLACK);
        assert_eq!(palette.match_color(&grey(1.0)), white);
    }

    #[test]
    fn empty_palette_matches_black() {
        let palette = BrightnessPalette::new();
        assert_eq!(palette.match_color(&grey(128.0)), Color::BLACK);
    }

    #[test]
    fn build_palette_indexes_extracted_colors() {
        let extractor = FixedPalette::new(vec![grey(0.0), grey(100.0), grey(100.2), grey(255.0)]);
        let palette = build_palette(&extractor, Path::new("unused.png"), 4).unwrap();

        assert_eq!(palette.keys().collect::<Vec<_>>(), vec![0, 100, 255]);
        assert_eq!(palette.get(100), Some(&grey(100.2)));
    }

    #[test]
    fn build_palette_accepts_fewer_colors() {
        let extractor = FixedPalette::new(vec![grey(30.0)]);
        let palette = build_palette(&extractor, Path::new("unused.png"), 8).unwrap();
        assert_eq!(palette.len(), 1);
    }
}
