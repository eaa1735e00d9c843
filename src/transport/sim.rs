//! In-memory board simulator.
//!
//! Mirrors the real backend's observable behavior closely enough to develop
//! and test against: a per-serial GRB hardware buffer, JSON layout files,
//! gamma-corrected image projection and synthetic temperature readings.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use image::GenericImageView;
use tokio::sync::Mutex;

use super::{Transport, TransportError};
use crate::layout::Dimensions;
use crate::models::{DeviceDescriptor, LedColorUpdate, Rgb};

/// Serial number of the synthetic test board
pub const TEST_SERIAL: &str = "12345";

const MANUFACTURER: &str = "Raspberry Pi";
const PRODUCT: &str = "Pico";

/// Gamma correction table applied to decoded image pixels, matching the
/// board firmware's perceptual curve
const GAMMA_LUT: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4, 5,
    5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 10, 11, 11, 11, 12, 12, 13, 13,
    13, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 21, 22, 22, 23, 24, 24, 25,
    25, 26, 27, 27, 28, 29, 29, 30, 31, 32, 32, 33, 34, 35, 35, 36, 37, 38, 39, 39, 40, 41, 42,
    43, 44, 45, 46, 47, 48, 49, 50, 50, 51, 52, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, 66,
    67, 68, 69, 70, 72, 73, 74, 75, 77, 78, 79, 81, 82, 83, 85, 86, 87, 89, 90, 92, 93, 95, 96,
    98, 99, 101, 102, 104, 105, 107, 109, 110, 112, 114, 115, 117, 119, 120, 122, 124, 126, 127,
    129, 131, 133, 135, 137, 138, 140, 142, 144, 146, 148, 150, 152, 154, 156, 158, 160, 162, 164,
    167, 169, 171, 173, 175, 177, 180, 182, 184, 186, 189, 191, 193, 196, 198, 200, 203, 205, 208,
    210, 213, 215, 218, 220, 223, 225, 228, 231, 233, 236, 239, 241, 244, 247, 249, 252, 255,
];

#[derive(Debug)]
struct SimBoard {
    /// Hardware buffer, one GRB triple per LED in wire order
    buffer: Vec<u8>,
    reachable: bool,
    friendly_name: Option<String>,
}

impl SimBoard {
    fn new(dimensions: Dimensions) -> Self {
        Self {
            buffer: vec![0; dimensions.led_count() * 3],
            reachable: true,
            friendly_name: None,
        }
    }
}

pub struct SimTransport {
    dimensions: Dimensions,
    boards: Mutex<HashMap<String, SimBoard>>,
}

impl SimTransport {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            boards: Mutex::new(Default::default()),
        }
    }

    /// Make a board with the given serial number discoverable
    pub async fn add_board(&self, serial_number: &str) {
        self.boards
            .lock()
            .await
            .entry(serial_number.to_owned())
            .or_insert_with(|| SimBoard::new(self.dimensions));
    }

    /// Fault injection: an unreachable board fails its connection check
    pub async fn set_reachable(&self, serial_number: &str, reachable: bool) {
        if let Some(board) = self.boards.lock().await.get_mut(serial_number) {
            board.reachable = reachable;
        }
    }

    /// Inspect a board's raw hardware buffer (GRB triples in wire order)
    pub async fn led_buffer(&self, serial_number: &str) -> Option<Vec<u8>> {
        self.boards
            .lock()
            .await
            .get(serial_number)
            .map(|board| board.buffer.clone())
    }

    async fn with_board<T>(
        &self,
        serial_number: &str,
        f: impl FnOnce(&mut SimBoard) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        let mut boards = self.boards.lock().await;
        match boards.get_mut(serial_number) {
            Some(board) => f(board),
            None => Err(TransportError::DeviceNotFound(serial_number.to_owned())),
        }
    }

    /// Deterministic per-board sensor readings
    fn base_temperatures(serial_number: &str) -> Vec<f32> {
        let seed = serial_number
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

        (0..4)
            .map(|sensor| 35.0 + ((seed >> (sensor * 4)) & 0xF) as f32 / 4.0)
            .collect()
    }

    fn decode_image(path: &Path, dimensions: Dimensions) -> Result<Vec<Rgb>, TransportError> {
        let img = image::open(path)?;
        let resized = img.resize_exact(
            dimensions.width as u32,
            dimensions.height as u32,
            image::imageops::FilterType::Triangle,
        );

        let mut pixels = vec![Rgb { r: 0, g: 0, b: 0 }; dimensions.led_count()];
        for (x, y, pixel) in resized.pixels() {
            pixels[y as usize * dimensions.width + x as usize] = Rgb {
                r: GAMMA_LUT[pixel[0] as usize],
                g: GAMMA_LUT[pixel[1] as usize],
                b: GAMMA_LUT[pixel[2] as usize],
            };
        }

        Ok(pixels)
    }

    /// Gradient used when the testing flag is set: red ramps along columns,
    /// green along rows
    fn test_pattern(dimensions: Dimensions) -> Vec<Rgb> {
        let wmax = dimensions.width.max(2) - 1;
        let hmax = dimensions.height.max(2) - 1;

        dimensions
            .cells()
            .map(|(row, col)| Rgb {
                r: (col * 255 / wmax) as u8,
                g: (row * 255 / hmax) as u8,
                b: 64,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn find_devices(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let boards = self.boards.lock().await;
        let mut serials: Vec<_> = boards.keys().cloned().collect();
        serials.sort();

        Ok(serials
            .into_iter()
            .map(|serial_number| DeviceDescriptor {
                manufacturer: MANUFACTURER.to_owned(),
                product: PRODUCT.to_owned(),
                serial_number,
            })
            .collect())
    }

    async fn connect(&self, serial_number: &str) -> Result<bool, TransportError> {
        self.with_board(serial_number, |board| {
            if board.reachable {
                Ok(true)
            } else {
                Err(TransportError::DeviceNotFound(serial_number.to_owned()))
            }
        })
        .await
    }

    async fn set_friendly_name(
        &self,
        serial_number: &str,
        friendly_name: &str,
    ) -> Result<(), TransportError> {
        self.with_board(serial_number, |board| {
            board.friendly_name = Some(friendly_name.to_owned());
            Ok(())
        })
        .await
    }

    async fn temperatures(&self, serial_number: &str) -> Result<Vec<f32>, TransportError> {
        self.with_board(serial_number, |board| {
            if board.reachable {
                Ok(Self::base_temperatures(serial_number))
            } else {
                Err(TransportError::DeviceNotFound(serial_number.to_owned()))
            }
        })
        .await
    }

    async fn update_led_color(
        &self,
        serial_number: &str,
        update: LedColorUpdate,
    ) -> Result<(), TransportError> {
        let count = self.dimensions.led_count();

        self.with_board(serial_number, |board| {
            if update.index >= count {
                return Err(TransportError::InvalidIndex {
                    index: update.index,
                    count,
                });
            }

            let base = update.index * 3;
            board.buffer[base] = update.color.g;
            board.buffer[base + 1] = update.color.r;
            board.buffer[base + 2] = update.color.b;
            Ok(())
        })
        .await
    }

    async fn update_led_buffer(
        &self,
        serial_number: &str,
        colors: &[Rgb],
    ) -> Result<(), TransportError> {
        let count = self.dimensions.led_count();

        if colors.len() != count {
            return Err(TransportError::InvalidIndex {
                index: colors.len(),
                count,
            });
        }

        self.with_board(serial_number, |board| {
            for (index, color) in colors.iter().enumerate() {
                let base = index * 3;
                board.buffer[base] = color.g;
                board.buffer[base + 1] = color.r;
                board.buffer[base + 2] = color.b;
            }
            Ok(())
        })
        .await
    }

    async fn clear_board(&self, serial_number: &str) -> Result<(), TransportError> {
        self.with_board(serial_number, |board| {
            board.buffer.fill(0);
            Ok(())
        })
        .await
    }

    async fn save_layout(
        &self,
        serial_number: &str,
        path: &Path,
    ) -> Result<(), TransportError> {
        let buffer = self
            .with_board(serial_number, |board| Ok(board.buffer.clone()))
            .await?;

        let json = serde_json::to_vec(&buffer)?;
        tokio::fs::write(path, json).await?;

        debug!(serial = %serial_number, path = %path.display(), "layout saved");
        Ok(())
    }

    async fn load_layout(
        &self,
        serial_number: &str,
        path: &Path,
    ) -> Result<Vec<u8>, TransportError> {
        let contents = tokio::fs::read(path).await?;
        let values: Vec<u8> = serde_json::from_slice(&contents)?;

        let expected = self.dimensions.led_count() * 3;
        if values.len() != expected {
            return Err(TransportError::InvalidLayout {
                path: path.display().to_string(),
                expected,
                actual: values.len(),
            });
        }

        self.with_board(serial_number, |board| {
            board.buffer.copy_from_slice(&values);
            Ok(())
        })
        .await?;

        debug!(serial = %serial_number, path = %path.display(), "layout loaded");
        Ok(values)
    }

    async fn process_image(
        &self,
        serial_number: &str,
        path: &Path,
        dimensions: Dimensions,
        testing: bool,
    ) -> Result<Vec<Rgb>, TransportError> {
        let pixels = if testing {
            Self::test_pattern(dimensions)
        } else {
            Self::decode_image(path, dimensions)?
        };

        // The returned pixels are row-major for display; the hardware
        // buffer wants them in wire order.
        self.with_board(serial_number, |board| {
            for (row, col) in dimensions.cells() {
                let rgb = pixels[row * dimensions.width + col];
                let base = dimensions.wire_index(row, col) * 3;
                board.buffer[base] = rgb.g;
                board.buffer[base + 1] = rgb.r;
                board.buffer[base + 2] = rgb.b;
            }
            Ok(())
        })
        .await?;

        Ok(pixels)
    }

    async fn update_firmware(&self, serial_number: &str) -> Result<(), TransportError> {
        self.with_board(serial_number, |_| {
            Err(TransportError::NotSupported("firmware update not implemented"))
        })
        .await
    }
}
