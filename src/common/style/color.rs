use serde::Serialize;
use std::fmt;

/// RGBA color with 8-bit channels.
///
/// Alpha is 255 for fully opaque colors, which is also what a color table
/// entry without an `\alpha` word resolves to.
///
/// # Examples
///
/// ```rust
/// use rtflayout::common::Rgba;
///
/// let red = Rgba::opaque(255, 0, 0);
/// assert_eq!(red.a, 255);
/// assert_eq!(red.to_hex(), "FF0000FF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
    /// Alpha component (0-255, 255 is opaque)
    pub a: u8,
}

impl Rgba {
    /// Create a new color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color.
    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, u8::MAX)
    }

    /// Alpha as a fraction in `0.0..=1.0`.
    #[inline]
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Convert to hex string (`RRGGBBAA`, without `#` prefix).
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::opaque(0, 0, 0)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}
