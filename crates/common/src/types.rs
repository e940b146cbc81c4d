use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer grid coordinates of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// Errors from parsing a color literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("color literal must start with '#': {0:?}")]
    MissingHash(String),
    #[error("color literal must have 6 or 8 hex digits: {0:?}")]
    BadLength(String),
    #[error("invalid hex digits in color literal: {0:?}")]
    BadDigits(String),
    #[error("color value {0:#x} does not fit in 24 bits")]
    OutOfRange(u32),
}

/// An 8-bit RGBA color.
///
/// Serialized as a `#rrggbbaa` string. Deserializes from either a string
/// (`#rrggbb` or `#rrggbbaa`) or a `0xRRGGBB` integer, which is how model
/// color tables and world generators write colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Fill used for tiles that carry neither a texture nor a color.
    pub const NEUTRAL: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from a `0xRRGGBB` value.
    pub fn from_hex(value: u32) -> Result<Self, ColorError> {
        if value > 0x00ff_ffff {
            return Err(ColorError::OutOfRange(value));
        }
        Ok(Self::rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }

    /// Same color with alpha given as a fraction in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    pub fn parse(text: &str) -> Result<Self, ColorError> {
        let digits = text
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(text.to_string()))?;
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ColorError::BadLength(text.to_string()));
        }
        let value =
            u32::from_str_radix(digits, 16).map_err(|_| ColorError::BadDigits(text.to_string()))?;
        if digits.len() == 6 {
            Self::from_hex(value)
        } else {
            Ok(Self::rgba(
                (value >> 24) as u8,
                ((value >> 16) & 0xff) as u8,
                ((value >> 8) & 0xff) as u8,
                (value & 0xff) as u8,
            ))
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(u32),
    Text(String),
}

impl TryFrom<ColorRepr> for Color {
    type Error = ColorError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(value) => Color::from_hex(value),
            ColorRepr::Text(text) => Color::parse(&text),
        }
    }
}
