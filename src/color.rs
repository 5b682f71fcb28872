use image::Rgb;
use palette::Srgb;

/// An RGB triple with components conceptually in `0.0..=255.0`.
///
/// Components stay floating point so block averages keep their precision
/// until they are written back into an 8-bit image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn brightness(&self) -> f64 {
        brightness(self)
    }

    /// Truncates each component toward zero, clamped to the 8-bit range.
    pub fn to_rgb8(&self) -> Rgb<u8> {
        Rgb([self.r as u8, self.g as u8, self.b as u8])
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Color::from((r, g, b))
    }
}

impl From<Srgb<u8>> for Color {
    fn from(srgb: Srgb<u8>) -> Self {
        Color::from((srgb.red, srgb.green, srgb.blue))
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::new(r as f64, g as f64, b as f64)
    }
}

/// Perceived brightness: `sqrt(0.241 r² + 0.691 g² + 0.068 b²)`.
pub fn brightness(color: &Color) -> f64 {
    (0.241 * color.r.powi(2) + 0.691 * color.g.powi(2) + 0.068 * color.b.powi(2)).sqrt()
}

/// Quadratic mean of each channel, see sighack.com/post/averaging-rgb-colors-the-right-way
///
/// Returns `None` for an empty slice.
pub fn average(colors: &[Color]) -> Option<Color> {
    if colors.is_empty() {
        return None;
    }
    let (r_total, g_total, b_total) = colors.iter().fold((0.0f64, 0.0f64, 0.0f64), |acc, c| {
        (acc.0 + c.r.powi(2), acc.1 + c.g.powi(2), acc.2 + c.b.powi(2))
    });
    let amount = colors.len() as f64;
    Some(Color::new(
        (r_total / amount).sqrt(),
        (g_total / amount).sqrt(),
        (b_total / amount).sqrt(),
    ))
}
