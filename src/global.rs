//! Process-wide shared state: the device registry, per-device matrix state
//! and the event channel the poller publishes on.

use std::collections::HashMap;
use std::sync::Arc;

use parse_display::Display;
use tokio::sync::{broadcast, RwLock};

use crate::layout::Dimensions;
use crate::matrix::Matrix;
use crate::models::{Color, DeviceId, Tool};
use crate::registry::{Registration, Registry};

/// Status updates published by the poller and command handlers
#[derive(Debug, Clone, Display)]
pub enum Event {
    #[display("Connection({device}): {connected}")]
    Connection { device: DeviceId, connected: bool },
    #[display("Temperatures({device}): {readings:?}")]
    Temperatures { device: DeviceId, readings: Vec<f32> },
}

/// Thread-safe handle to the shared state
#[derive(Clone)]
pub struct Global(Arc<RwLock<GlobalData>>);

pub struct GlobalData {
    dimensions: Dimensions,
    registry: Registry,
    matrices: HashMap<DeviceId, Matrix>,
    event_tx: broadcast::Sender<Event>,
}

impl GlobalData {
    pub fn new(dimensions: Dimensions) -> Self {
        let (event_tx, _) = broadcast::channel(16);

        Self {
            dimensions,
            registry: Registry::new(),
            matrices: Default::default(),
            event_tx,
        }
    }

    pub fn wrap(self) -> Global {
        Global(Arc::new(RwLock::new(self)))
    }
}

impl Global {
    pub async fn dimensions(&self) -> Dimensions {
        self.0.read().await.dimensions
    }

    /// Register a device, creating its (blank) matrix state
    pub async fn register_device(
        &self,
        device: DeviceId,
        serial_number: &str,
        friendly_name: Option<&str>,
    ) {
        let mut data = self.0.write().await;
        let dimensions = data.dimensions;

        data.registry.register(
            device,
            Registration::new(
                serial_number.to_owned(),
                friendly_name.map(str::to_owned),
            ),
        );
        data.matrices
            .entry(device)
            .or_insert_with(|| Matrix::new(dimensions));
    }

    pub async fn serial_number(&self, device: DeviceId) -> Option<String> {
        self.0
            .read()
            .await
            .registry
            .serial_number(device)
            .map(str::to_owned)
    }

    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.0.read().await.registry.device_ids()
    }

    pub async fn tool(&self, device: DeviceId) -> Tool {
        self.0.read().await.registry.tool(device)
    }

    pub async fn set_tool(&self, device: DeviceId, tool: Tool) {
        self.0.write().await.registry.set_tool(device, tool);
    }

    pub async fn picker_color(&self, device: DeviceId) -> Color {
        self.0.read().await.registry.picker_color(device)
    }

    pub async fn set_picker_color(&self, device: DeviceId, color: Color) {
        self.0.write().await.registry.set_picker_color(device, color);
    }

    /// Run a closure over a device's matrix, if the device is registered
    pub async fn with_matrix<T>(
        &self,
        device: DeviceId,
        f: impl FnOnce(&Matrix) -> T,
    ) -> Option<T> {
        self.0.read().await.matrices.get(&device).map(f)
    }

    /// Run a closure over a device's matrix, mutably
    pub async fn with_matrix_mut<T>(
        &self,
        device: DeviceId,
        f: impl FnOnce(&mut Matrix) -> T,
    ) -> Option<T> {
        self.0.write().await.matrices.get_mut(&device).map(f)
    }

    pub async fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.0.read().await.event_tx.subscribe()
    }

    /// Publish an event; having no subscribers is not an error
    pub async fn publish(&self, event: Event) {
        self.0.read().await.event_tx.send(event).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_creates_matrix() {
        let global = GlobalData::new(Dimensions::PCIE_BOARD).wrap();

        assert!(global
            .with_matrix(DeviceId(1), |matrix| matrix.dimensions())
            .await
            .is_none());

        global.register_device(DeviceId(1), "A1B2", Some("desk")).await;

        assert_eq!(
            Some(Dimensions::PCIE_BOARD),
            global
                .with_matrix(DeviceId(1), |matrix| matrix.dimensions())
                .await
        );
        assert_eq!(Some("A1B2".to_owned()), global.serial_number(DeviceId(1)).await);
    }

    #[tokio::test]
    async fn test_reregister_keeps_matrix() {
        let global = GlobalData::new(Dimensions::PCIE_BOARD).wrap();
        global.register_device(DeviceId(1), "A1B2", None).await;

        global
            .with_matrix_mut(DeviceId(1), |matrix| {
                matrix.set(0, 0, Color::new(1, 2, 3))
            })
            .await;

        global.register_device(DeviceId(1), "A1B2", Some("named")).await;

        assert_eq!(
            Some(Color::new(1, 2, 3)),
            global
                .with_matrix(DeviceId(1), |matrix| matrix.get(0, 0))
                .await
        );
    }

    #[tokio::test]
    async fn test_events_broadcast() {
        let global = GlobalData::new(Dimensions::PCIE_BOARD).wrap();
        let mut rx = global.subscribe_events().await;

        global
            .publish(Event::Connection {
                device: DeviceId(1),
                connected: true,
            })
            .await;

        match rx.recv().await.unwrap() {
            Event::Connection { device, connected } => {
                assert_eq!(DeviceId(1), device);
                assert!(connected);
            }
            other => panic!("unexpected event: {}", other),
        }
    }
}
