//! The backend command surface.
//!
//! Every hardware interaction goes through one of the named commands on
//! [`Transport`]; the core never talks to the physical link directly.
//! Commands are keyed by serial number, which callers resolve through the
//! device registry first.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::layout::Dimensions;
use crate::models::{DeviceDescriptor, LedColorUpdate, Rgb};

pub mod sim;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("layout document error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("device with serial number {0} not found")]
    DeviceNotFound(String),
    #[error("invalid layout data in {path}: expected {expected} values, got {actual}")]
    InvalidLayout {
        path: String,
        expected: usize,
        actual: usize,
    },
    #[error("LED index {index} out of range ({count} LEDs)")]
    InvalidIndex { index: usize, count: usize },
    #[error("not supported: {0}")]
    NotSupported(&'static str),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Enumerate reachable boards
    async fn find_devices(&self) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Check whether the board with the given serial number is reachable,
    /// (re)establishing the link if necessary
    async fn connect(&self, serial_number: &str) -> Result<bool, TransportError>;

    /// Store a user-assigned label on the backend
    async fn set_friendly_name(
        &self,
        serial_number: &str,
        friendly_name: &str,
    ) -> Result<(), TransportError>;

    /// Read the board's temperature sensors, in °C
    async fn temperatures(&self, serial_number: &str) -> Result<Vec<f32>, TransportError>;

    /// Set a single LED, addressed by wire index
    async fn update_led_color(
        &self,
        serial_number: &str,
        update: LedColorUpdate,
    ) -> Result<(), TransportError>;

    /// Replace the whole LED buffer; `colors` is one triple per LED in wire
    /// order
    async fn update_led_buffer(
        &self,
        serial_number: &str,
        colors: &[Rgb],
    ) -> Result<(), TransportError>;

    /// Turn every LED off
    async fn clear_board(&self, serial_number: &str) -> Result<(), TransportError>;

    /// Persist the board's current layout to `path`
    async fn save_layout(&self, serial_number: &str, path: &Path) -> Result<(), TransportError>;

    /// Load a layout from `path` into the board, returning the flat value
    /// sequence that was applied
    async fn load_layout(&self, serial_number: &str, path: &Path)
        -> Result<Vec<u8>, TransportError>;

    /// Decode and resize an image to the matrix, push it to the board and
    /// return the resulting pixels in visual row-major order.
    ///
    /// With `testing` set, a synthetic pattern is generated instead of
    /// reading `path`.
    async fn process_image(
        &self,
        serial_number: &str,
        path: &Path,
        dimensions: Dimensions,
        testing: bool,
    ) -> Result<Vec<Rgb>, TransportError>;

    /// Flash a firmware update to the board
    async fn update_firmware(&self, serial_number: &str) -> Result<(), TransportError>;
}
