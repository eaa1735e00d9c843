//! Image projection feedback.
//!
//! The `process image` command decodes, resizes and pushes an image to the
//! board on its own; this component only mirrors the returned pixel grid
//! onto the visual cells. The returned data is in row-major display order,
//! so no serpentine conversion happens here — that is the backend's job
//! when it fills its hardware buffer.

use std::path::PathBuf;
use std::sync::Arc;

use crate::global::Global;
use crate::models::DeviceId;
use crate::transport::{sim::TEST_SERIAL, Transport};

pub struct Projector {
    global: Global,
    transport: Arc<dyn Transport>,
}

impl Projector {
    pub fn new(global: Global, transport: Arc<dyn Transport>) -> Self {
        Self { global, transport }
    }

    /// Project an image file onto a device's matrix.
    ///
    /// A cancelled file selection (`None`) is a normal no-op. Per-pixel
    /// colors are written to the visual cells only; the backend already
    /// applied them to hardware.
    pub async fn project(&self, device: DeviceId, source: Option<PathBuf>) {
        let path = match source {
            Some(path) => path,
            None => {
                debug!(device = %device, "image selection cancelled");
                return;
            }
        };

        let serial_number = match self.global.serial_number(device).await {
            Some(serial_number) => serial_number,
            None => return,
        };

        let dimensions = self.global.dimensions().await;
        let testing = serial_number == TEST_SERIAL;

        let pixels = match self
            .transport
            .process_image(&serial_number, &path, dimensions, testing)
            .await
        {
            Ok(pixels) => pixels,
            Err(error) => {
                error!(device = %device, error = %error, "image processing failed");
                return;
            }
        };

        self.global
            .with_matrix_mut(device, |matrix| {
                for (row, col) in dimensions.cells() {
                    if let Some(&rgb) = pixels.get(row * dimensions.width + col) {
                        matrix.set(row, col, rgb.into());
                    }
                }
            })
            .await;

        info!(device = %device, path = %path.display(), "image projected");
    }
}
