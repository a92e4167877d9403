//! Option keys, option values and the small geometric types shared by filters.
//!
//! Every filter speaks the same option protocol: an opaque [`OptionKey`]
//! paired with a typed [`OptionValue`]. Keys below [`OptionKey::USER_BASE`]
//! are reserved for options every filter understands (the channel mask);
//! each filter numbers its own keys upwards from the user base.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A colour packed as `0x00RRGGBB`.
pub type PackedRgb = u32;

/// Pack three channel values into a [`PackedRgb`].
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> PackedRgb {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Split a [`PackedRgb`] into its red, green and blue channels.
#[inline]
pub fn unpack_rgb(rgb: PackedRgb) -> (u8, u8, u8) {
    (
        ((rgb >> 16) & 0xff) as u8,
        ((rgb >> 8) & 0xff) as u8,
        (rgb & 0xff) as u8,
    )
}

/// Identifier of a filter option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionKey(pub u32);

impl OptionKey {
    /// Channel mask, understood by every filter.
    pub const CHANNELS: OptionKey = OptionKey(0);

    /// First key available to individual filters.
    pub const USER_BASE: u32 = 0x100;

    /// A filter specific key, `offset` above the user base.
    pub const fn user(offset: u32) -> Self {
        OptionKey(Self::USER_BASE + offset)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == OptionKey::CHANNELS {
            write!(f, "channels")
        } else if self.0 >= Self::USER_BASE {
            write!(f, "user+{}", self.0 - Self::USER_BASE)
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Typed value carried by a filter option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// 64-bit signed integer
    Integer(i64),
    /// Floating point number, usually a percentage
    Float(f64),
    /// UTF-8 string, e.g. a channel mask or a file path
    String(String),
    /// Boolean flag
    Boolean(bool),
    /// Shared reference to a decoded image
    Image(Arc<RgbaImage>),
    /// Ordered list of packed RGB triples
    RgbList(Vec<PackedRgb>),
    /// Absence of a value, returned for unsupported keys
    None,
}

impl OptionValue {
    /// Try to get this value as a float.
    /// Integers are automatically converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            OptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as an integer.
    /// Floats are truncated toward zero.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            OptionValue::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_string(&self) -> Option<&str> {
        if let OptionValue::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        if let OptionValue::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Try to get this value as an image reference.
    pub fn as_image(&self) -> Option<&Arc<RgbaImage>> {
        if let OptionValue::Image(img) = self {
            Some(img)
        } else {
            None
        }
    }

    /// Try to get this value as a list of packed RGB triples.
    pub fn as_rgb_list(&self) -> Option<&[PackedRgb]> {
        if let OptionValue::RgbList(list) = self {
            Some(list)
        } else {
            None
        }
    }

    /// Check if this value is None.
    pub fn is_none(&self) -> bool {
        matches!(self, OptionValue::None)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Integer(i) => write!(f, "{}", i),
            OptionValue::Float(fl) => write!(f, "{:.2}", fl),
            OptionValue::String(s) => write!(f, "\"{}\"", s),
            OptionValue::Boolean(b) => write!(f, "{}", b),
            OptionValue::Image(img) => write!(f, "Image({}x{})", img.width(), img.height()),
            OptionValue::RgbList(list) => write!(f, "RgbList[{}]", list.len()),
            OptionValue::None => write!(f, "None"),
        }
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Boolean(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<Vec<PackedRgb>> for OptionValue {
    fn from(value: Vec<PackedRgb>) -> Self {
        OptionValue::RgbList(value)
    }
}

impl From<RgbaImage> for OptionValue {
    fn from(value: RgbaImage) -> Self {
        OptionValue::Image(Arc::new(value))
    }
}

impl From<Arc<RgbaImage>> for OptionValue {
    fn from(value: Arc<RgbaImage>) -> Self {
        OptionValue::Image(value)
    }
}

// ============================================================================
// Channel Mask
// ============================================================================

/// The colour channels a table driven transform is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelMask {
    /// Red channel enabled
    pub red: bool,
    /// Green channel enabled
    pub green: bool,
    /// Blue channel enabled
    pub blue: bool,
}

impl ChannelMask {
    /// All three colour channels.
    pub const RGB: ChannelMask = ChannelMask {
        red: true,
        green: true,
        blue: true,
    };

    /// No channels.
    pub const NONE: ChannelMask = ChannelMask {
        red: false,
        green: false,
        blue: false,
    };

    /// Parse a mask such as `"rgb"` or `"gb"`.
    ///
    /// Only the letters `r`, `g` and `b` are accepted, each at most once.
    pub fn parse(mask: &str) -> Result<Self, String> {
        let mut parsed = ChannelMask::NONE;
        for c in mask.chars() {
            let slot = match c {
                'r' => &mut parsed.red,
                'g' => &mut parsed.green,
                'b' => &mut parsed.blue,
                other => return Err(format!("unknown channel '{}' in mask \"{}\"", other, mask)),
            };
            if *slot {
                return Err(format!("duplicate channel '{}' in mask \"{}\"", c, mask));
            }
            *slot = true;
        }
        Ok(parsed)
    }

    /// Whether the channel at RGBA index `index` is enabled.
    pub fn includes(&self, index: usize) -> bool {
        match index {
            0 => self.red,
            1 => self.green,
            2 => self.blue,
            _ => false,
        }
    }
}

impl Default for ChannelMask {
    fn default() -> Self {
        ChannelMask::RGB
    }
}

impl fmt::Display for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.red {
            f.write_str("r")?;
        }
        if self.green {
            f.write_str("g")?;
        }
        if self.blue {
            f.write_str("b")?;
        }
        Ok(())
    }
}

// ============================================================================
// Clip Rectangle
// ============================================================================

/// Region of an image a filter is allowed to modify: `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipRect {
    /// First column inside the rectangle
    pub left: u32,
    /// First row inside the rectangle
    pub top: u32,
    /// First column past the rectangle
    pub right: u32,
    /// First row past the rectangle
    pub bottom: u32,
}

impl ClipRect {
    /// Create a rectangle from its edges.
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The rectangle covering a whole `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Resolve an optional clip against an image, limiting it to the image bounds.
    pub fn resolve(clip: Option<ClipRect>, width: u32, height: u32) -> Self {
        match clip {
            Some(rect) => rect.clamp_to(width, height),
            None => Self::full(width, height),
        }
    }

    /// Limit this rectangle to a `width` x `height` image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let right = self.right.min(width);
        let bottom = self.bottom.min(height);
        Self {
            left: self.left.min(right),
            top: self.top.min(bottom),
            right,
            bottom,
        }
    }

    /// Whether the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Whether `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}
