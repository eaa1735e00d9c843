//! Shared types and backend command shapes.

use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// 8-bit per channel RGB color
pub type Color = palette::rgb::LinSrgb<u8>;

/// Logical device number, assigned when the user confirms a friendly name
/// for a discovered serial number. Stable for the process session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    parse_display::Display,
)]
#[display("{0}")]
#[serde(transparent)]
pub struct DeviceId(pub u32);

/// Active paint tool for a device window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tool {
    Pencil,
    Eraser,
}

impl Default for Tool {
    fn default() -> Self {
        Self::Pencil
    }
}

/// Color triple as exchanged with the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<Color> for Rgb {
    fn from(color: Color) -> Self {
        let (r, g, b) = color.into_components();
        Self { r, g, b }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::new(rgb.r, rgb.g, rgb.b)
    }
}

/// Request shape of the `update led color` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedColorUpdate {
    /// Position in the physical wiring order
    pub index: usize,
    pub color: Rgb,
}

/// One entry of the `find devices` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub manufacturer: String,
    pub product: String,
    pub serial_number: String,
}
