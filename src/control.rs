//! Per-device command routing.
//!
//! Every operation resolves the logical device number to its serial number
//! through the registry before talking to the backend; a missing mapping
//! means "device unavailable" and the command is skipped. Backend failures
//! are caught at the call site, logged and swallowed — no failure here is
//! fatal, and optimistically applied visual state is never rolled back.

use std::path::PathBuf;
use std::sync::Arc;

use crate::global::{Event, Global};
use crate::layout::LayoutDocument;
use crate::models::{DeviceDescriptor, DeviceId};
use crate::transport::Transport;

pub struct Controller {
    global: Global,
    transport: Arc<dyn Transport>,
}

impl Controller {
    pub fn new(global: Global, transport: Arc<dyn Transport>) -> Self {
        Self { global, transport }
    }

    pub fn global(&self) -> &Global {
        &self.global
    }

    /// Confirm a friendly name for a discovered serial number and register
    /// the device under the given number
    pub async fn register_device(
        &self,
        device: DeviceId,
        serial_number: &str,
        friendly_name: Option<&str>,
    ) {
        if let Some(name) = friendly_name {
            if let Err(error) = self.transport.set_friendly_name(serial_number, name).await {
                error!(device = %device, error = %error, "setting friendly name failed");
            }
        }

        self.global
            .register_device(device, serial_number, friendly_name)
            .await;
    }

    /// Enumerate boards currently visible to the backend
    pub async fn refresh_devices(&self) -> Vec<DeviceDescriptor> {
        match self.transport.find_devices().await {
            Ok(devices) => {
                info!(count = devices.len(), "device list refreshed");
                devices
            }
            Err(error) => {
                error!(error = %error, "refreshing device list failed");
                Vec::new()
            }
        }
    }

    /// Turn every LED of a device off, on screen first and then on the
    /// board
    pub async fn clear_board(&self, device: DeviceId) {
        self.global
            .with_matrix_mut(device, |matrix| matrix.clear())
            .await;

        let serial_number = match self.global.serial_number(device).await {
            Some(serial_number) => serial_number,
            None => return,
        };

        if let Err(error) = self.transport.clear_board(&serial_number).await {
            error!(device = %device, error = %error, "clearing board failed");
        }
    }

    /// Persist a device's layout to the user-chosen destination.
    ///
    /// A cancelled destination dialog (`None`) is a normal no-op.
    pub async fn save_layout(&self, device: DeviceId, destination: Option<PathBuf>) {
        let path = match destination {
            Some(path) => path,
            None => {
                debug!(device = %device, "save operation cancelled");
                return;
            }
        };

        let serial_number = match self.global.serial_number(device).await {
            Some(serial_number) => serial_number,
            None => return,
        };

        match self.transport.save_layout(&serial_number, &path).await {
            Ok(()) => info!(device = %device, path = %path.display(), "layout saved"),
            Err(error) => error!(device = %device, error = %error, "saving layout failed"),
        }
    }

    /// Load a layout document from the user-chosen source and restore every
    /// visual cell from it.
    pub async fn load_layout(&self, device: DeviceId, source: Option<PathBuf>) {
        let path = match source {
            Some(path) => path,
            None => {
                debug!(device = %device, "load operation cancelled");
                return;
            }
        };

        let serial_number = match self.global.serial_number(device).await {
            Some(serial_number) => serial_number,
            None => return,
        };

        let values = match self.transport.load_layout(&serial_number, &path).await {
            Ok(values) => values,
            Err(error) => {
                error!(device = %device, error = %error, "loading layout failed");
                return;
            }
        };

        let dimensions = self.global.dimensions().await;
        let document = match LayoutDocument::from_values(dimensions, values) {
            Ok(document) => document,
            Err(error) => {
                error!(device = %device, error = %error, "malformed layout document");
                return;
            }
        };

        self.global
            .with_matrix_mut(device, |matrix| document.apply_to(matrix))
            .await;

        info!(device = %device, path = %path.display(), "layout loaded");
    }

    /// Push the on-screen matrix to the board in one write, without needing
    /// a cell-by-cell repaint
    pub async fn push_matrix(&self, device: DeviceId) {
        let serial_number = match self.global.serial_number(device).await {
            Some(serial_number) => serial_number,
            None => return,
        };

        let document = match self
            .global
            .with_matrix(device, |matrix| LayoutDocument::snapshot(matrix))
            .await
        {
            Some(document) => document,
            None => return,
        };

        let colors = document.wire_colors();
        if let Err(error) = self.transport.update_led_buffer(&serial_number, &colors).await {
            error!(device = %device, error = %error, "pushing matrix failed");
        }
    }

    /// Read a device's temperature sensors, publishing the readings as an
    /// event
    pub async fn read_temperatures(&self, device: DeviceId) -> Option<Vec<f32>> {
        let serial_number = self.global.serial_number(device).await?;

        match self.transport.temperatures(&serial_number).await {
            Ok(readings) => {
                self.global
                    .publish(Event::Temperatures {
                        device,
                        readings: readings.clone(),
                    })
                    .await;
                Some(readings)
            }
            Err(error) => {
                error!(device = %device, error = %error, "reading temperatures failed");
                None
            }
        }
    }

    /// Flash a firmware update
    pub async fn update_firmware(&self, device: DeviceId) {
        let serial_number = match self.global.serial_number(device).await {
            Some(serial_number) => serial_number,
            None => return,
        };

        match self.transport.update_firmware(&serial_number).await {
            Ok(()) => info!(device = %device, "firmware updated"),
            Err(error) => error!(device = %device, error = %error, "firmware update failed"),
        }
    }
}
