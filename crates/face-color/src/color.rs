use std::fmt;

use crate::named;

/// Color with 16-bit channels, as window systems report them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("empty color specification")]
    Empty,
    #[error("unknown color name: {0}")]
    UnknownName(String),
    #[error("malformed hex color: {0}")]
    MalformedHex(String),
    #[error("malformed rgb: color: {0}")]
    MalformedRgb(String),
}

impl Color {
    pub const BLACK: Color = Color { red: 0, green: 0, blue: 0 };
    pub const WHITE: Color = Color { red: 0xffff, green: 0xffff, blue: 0xffff };

    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    /// Widen 8-bit channels (0xab becomes 0xabab).
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            red: (r as u16) << 8 | r as u16,
            green: (g as u16) << 8 | g as u16,
            blue: (b as u16) << 8 | b as u16,
        }
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        ((self.red >> 8) as u8, (self.green >> 8) as u8, (self.blue >> 8) as u8)
    }

    /// Channels scaled to 0.0..=1.0 for renderers working in floating point.
    pub fn to_f64(self) -> (f64, f64, f64) {
        let scale = |c: u16| c as f64 / 65535.0;
        (scale(self.red), scale(self.green), scale(self.blue))
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrrgggbbb`, `#rrrrggggbbbb`, `rgb:r/g/b`
    /// or a color name from the built-in table.
    pub fn parse(spec: &str) -> Result<Self, ColorParseError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if let Some(hex) = spec.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::MalformedHex(spec.to_string()));
        }
        if let Some(body) = spec.strip_prefix("rgb:").or_else(|| spec.strip_prefix("RGB:")) {
            return parse_rgb_slashes(body).ok_or_else(|| ColorParseError::MalformedRgb(spec.to_string()));
        }
        named::lookup(spec).ok_or_else(|| ColorParseError::UnknownName(spec.to_string()))
    }

    /// Largest channel value.
    pub fn max_channel(self) -> u16 {
        self.red.max(self.green).max(self.blue)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

/// Scale an N-digit hex channel to 16 bits.
fn scale_channel(digits: &str) -> Option<u16> {
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let max = (1u32 << (4 * digits.len() as u32)) - 1;
    Some(((value * 0xffff + max / 2) / max) as u16)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let width = match hex.len() {
        3 | 6 | 9 | 12 => hex.len() / 3,
        _ => return None,
    };
    Some(Color {
        red: scale_channel(&hex[..width])?,
        green: scale_channel(&hex[width..2 * width])?,
        blue: scale_channel(&hex[2 * width..])?,
    })
}

fn parse_rgb_slashes(body: &str) -> Option<Color> {
    let mut parts = body.split('/');
    let red = scale_channel(parts.next()?)?;
    let green = scale_channel(parts.next()?)?;
    let blue = scale_channel(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Color { red, green, blue })
}
