//! Device registry: the single source of truth mapping a logical device
//! number to its hardware identity and UI tool state.

use std::collections::BTreeMap;

use crate::models::{Color, DeviceId, Tool};

/// Registry entry for one device
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// Hardware-unique serial number, the only key backend commands accept
    pub serial_number: String,
    /// User-assigned label, optional until set
    pub friendly_name: Option<String>,
    /// Active paint tool for this device's window
    pub tool: Tool,
    /// Current color-picker value for this device's window
    pub picker_color: Color,
}

impl Registration {
    pub fn new(serial_number: String, friendly_name: Option<String>) -> Self {
        Self {
            serial_number,
            friendly_name,
            tool: Tool::default(),
            picker_color: Color::new(255, 255, 255),
        }
    }
}

/// Maps logical device numbers to registrations.
///
/// Devices live for the process session; there is no deregistration.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<DeviceId, Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Insert or overwrite the entry for a device number
    pub fn register(&mut self, device: DeviceId, registration: Registration) {
        info!(
            device = %device,
            serial = %registration.serial_number,
            "registered device"
        );
        self.entries.insert(device, registration);
    }

    pub fn get(&self, device: DeviceId) -> Option<&Registration> {
        self.entries.get(&device)
    }

    /// Resolve the serial number for a device number.
    ///
    /// A missing mapping is "device unavailable", not an error: it is logged
    /// as a warning and callers are expected to skip the backend call.
    pub fn serial_number(&self, device: DeviceId) -> Option<&str> {
        match self.entries.get(&device) {
            Some(registration) => Some(registration.serial_number.as_str()),
            None => {
                warn!(device = %device, "no device found for device number");
                None
            }
        }
    }

    /// Active tool for a device window, defaulting to the pencil
    pub fn tool(&self, device: DeviceId) -> Tool {
        self.entries
            .get(&device)
            .map(|registration| registration.tool)
            .unwrap_or_default()
    }

    pub fn set_tool(&mut self, device: DeviceId, tool: Tool) {
        if let Some(registration) = self.entries.get_mut(&device) {
            registration.tool = tool;
        } else {
            warn!(device = %device, tool = %tool, "tool change for unregistered device ignored");
        }
    }

    pub fn picker_color(&self, device: DeviceId) -> Color {
        self.entries
            .get(&device)
            .map(|registration| registration.picker_color)
            .unwrap_or_else(|| Color::new(255, 255, 255))
    }

    pub fn set_picker_color(&mut self, device: DeviceId, color: Color) {
        if let Some(registration) = self.entries.get_mut(&device) {
            registration.picker_color = color;
        }
    }

    /// Registered device numbers in ascending order
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
