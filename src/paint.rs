//! The paint interaction state machine.
//!
//! Pointer gestures over any device's matrix turn into color writes: a
//! pointer-down paints the cell under it and starts a drag, pointer-enter
//! while held paints every cell the pointer crosses, and a release anywhere
//! ends painting for all devices at once. The pressed flag is owned by the
//! [`Painter`] so the machine is testable without a UI.

use std::sync::Arc;

use crate::global::Global;
use crate::models::{Color, DeviceId, LedColorUpdate, Tool};
use crate::transport::Transport;

/// Pointer gestures as reported by the UI layer
#[derive(Debug, Clone, Copy)]
pub enum PointerEvent {
    /// Pointer pressed over a cell
    Down {
        device: DeviceId,
        row: usize,
        col: usize,
    },
    /// Pointer entered a cell (with or without the button held)
    Enter {
        device: DeviceId,
        row: usize,
        col: usize,
    },
    /// Pointer released, anywhere in the UI
    Up,
}

/// Coordinator turning pointer gestures into color writes
pub struct Painter {
    global: Global,
    transport: Arc<dyn Transport>,
    pressed: bool,
}

impl Painter {
    pub fn new(global: Global, transport: Arc<dyn Transport>) -> Self {
        Self {
            global,
            transport,
            pressed: false,
        }
    }

    /// Whether a drag is currently in progress
    pub fn is_painting(&self) -> bool {
        self.pressed
    }

    pub async fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { device, row, col } => {
                self.pressed = true;
                self.apply(device, row, col).await;
            }
            PointerEvent::Enter { device, row, col } => {
                if self.pressed {
                    self.apply(device, row, col).await;
                }
            }
            PointerEvent::Up => {
                self.pressed = false;
            }
        }
    }

    /// Direct click handler: a one-cell paint. Idempotent with the
    /// pointer-down path, so both firing for the same click is harmless.
    pub async fn click(&self, device: DeviceId, row: usize, col: usize) {
        self.apply(device, row, col).await;
    }

    #[instrument(skip(self))]
    async fn apply(&self, device: DeviceId, row: usize, col: usize) {
        let color = match self.global.tool(device).await {
            Tool::Pencil => self.global.picker_color(device).await,
            Tool::Eraser => Color::new(0, 0, 0),
        };

        // Optimistic update: the visual cell changes before the backend
        // write is dispatched, and a failure never rolls it back.
        let updated = self
            .global
            .with_matrix_mut(device, |matrix| matrix.set(row, col, color))
            .await
            .is_some();

        if !updated {
            warn!(device = %device, "paint on unregistered device ignored");
            return;
        }

        let serial_number = match self.global.serial_number(device).await {
            Some(serial_number) => serial_number,
            // The registry already logged the miss; device is unavailable
            None => return,
        };

        let index = self.global.dimensions().await.wire_index(row, col);
        let update = LedColorUpdate {
            index,
            color: color.into(),
        };

        if let Err(error) = self.transport.update_led_color(&serial_number, update).await {
            error!(device = %device, error = %error, "LED color update failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global::GlobalData;
    use crate::layout::Dimensions;
    use crate::transport::sim::SimTransport;

    async fn setup() -> (Global, Arc<SimTransport>, Painter) {
        let dimensions = Dimensions::PCIE_BOARD;
        let global = GlobalData::new(dimensions).wrap();
        let transport = Arc::new(SimTransport::new(dimensions));

        transport.add_board("A1B2").await;
        global.register_device(DeviceId(1), "A1B2", Some("desk")).await;

        let painter = Painter::new(global.clone(), transport.clone() as Arc<dyn Transport>);
        (global, transport, painter)
    }

    async fn cell(global: &Global, device: DeviceId, row: usize, col: usize) -> Color {
        global
            .with_matrix(device, |matrix| matrix.get(row, col))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_drag_continuity() {
        let (global, transport, mut painter) = setup().await;
        let device = DeviceId(1);
        global.set_picker_color(device, Color::new(200, 10, 10)).await;

        painter
            .handle(PointerEvent::Down {
                device,
                row: 0,
                col: 0,
            })
            .await;
        painter
            .handle(PointerEvent::Enter {
                device,
                row: 0,
                col: 1,
            })
            .await;
        painter
            .handle(PointerEvent::Enter {
                device,
                row: 0,
                col: 2,
            })
            .await;
        painter.handle(PointerEvent::Up).await;

        for col in 0..3 {
            assert_eq!(Color::new(200, 10, 10), cell(&global, device, 0, col).await);
        }

        // Released: entering further cells paints nothing
        painter
            .handle(PointerEvent::Enter {
                device,
                row: 0,
                col: 3,
            })
            .await;
        assert_eq!(Color::new(0, 0, 0), cell(&global, device, 0, 3).await);
        assert!(!painter.is_painting());

        // And the backend buffer saw the same writes
        let dimensions = global.dimensions().await;
        let buffer = transport.led_buffer("A1B2").await.unwrap();
        let base = dimensions.wire_index(0, 1) * 3;
        assert_eq!(&[10, 200, 10], &buffer[base..base + 3]);
        let base = dimensions.wire_index(0, 3) * 3;
        assert_eq!(&[0, 0, 0], &buffer[base..base + 3]);
    }

    #[tokio::test]
    async fn test_enter_without_press_is_ignored() {
        let (global, _transport, mut painter) = setup().await;
        let device = DeviceId(1);

        painter
            .handle(PointerEvent::Enter {
                device,
                row: 4,
                col: 4,
            })
            .await;

        assert_eq!(Color::new(0, 0, 0), cell(&global, device, 4, 4).await);
    }

    #[tokio::test]
    async fn test_tool_exclusivity() {
        let (global, _transport, mut painter) = setup().await;
        let device = DeviceId(1);
        global.set_picker_color(device, Color::new(50, 60, 70)).await;

        painter
            .handle(PointerEvent::Down {
                device,
                row: 2,
                col: 2,
            })
            .await;
        painter.handle(PointerEvent::Up).await;
        assert_eq!(Color::new(50, 60, 70), cell(&global, device, 2, 2).await);

        // The eraser always writes black, regardless of the picker
        global.set_tool(device, Tool::Eraser).await;
        painter
            .handle(PointerEvent::Down {
                device,
                row: 2,
                col: 2,
            })
            .await;
        painter.handle(PointerEvent::Up).await;

        assert_eq!(Color::new(0, 0, 0), cell(&global, device, 2, 2).await);
        assert!(
            !global
                .with_matrix(device, |matrix| matrix.active(2, 2))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_click_and_down_are_idempotent() {
        let (global, transport, mut painter) = setup().await;
        let device = DeviceId(1);
        global.set_picker_color(device, Color::new(1, 2, 3)).await;

        // A click fires both the direct handler and the down handler
        painter.click(device, 5, 5).await;
        painter
            .handle(PointerEvent::Down {
                device,
                row: 5,
                col: 5,
            })
            .await;
        painter.handle(PointerEvent::Up).await;

        assert_eq!(Color::new(1, 2, 3), cell(&global, device, 5, 5).await);

        let buffer = transport.led_buffer("A1B2").await.unwrap();
        let base = global.dimensions().await.wire_index(5, 5) * 3;
        assert_eq!(&[2, 1, 3], &buffer[base..base + 3]);
    }

    #[tokio::test]
    async fn test_release_ends_painting_for_all_devices() {
        let (global, transport, mut painter) = setup().await;
        transport.add_board("C3D4").await;
        global.register_device(DeviceId(2), "C3D4", None).await;

        painter
            .handle(PointerEvent::Down {
                device: DeviceId(1),
                row: 0,
                col: 0,
            })
            .await;
        painter.handle(PointerEvent::Up).await;

        // The drag started on device 1 but the release is global
        painter
            .handle(PointerEvent::Enter {
                device: DeviceId(2),
                row: 0,
                col: 0,
            })
            .await;

        assert_eq!(
            Color::new(0, 0, 0),
            cell(&global, DeviceId(2), 0, 0).await
        );
    }

    #[tokio::test]
    async fn test_unregistered_device_paint_is_skipped() {
        let (global, _transport, mut painter) = setup().await;

        painter
            .handle(PointerEvent::Down {
                device: DeviceId(9),
                row: 0,
                col: 0,
            })
            .await;

        assert!(global
            .with_matrix(DeviceId(9), |matrix| matrix.get(0, 0))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_visual_state() {
        let (global, transport, mut painter) = setup().await;
        let device = DeviceId(1);

        // Re-register pointing at a serial the backend doesn't know;
        // the dispatch fails but the cell still updates.
        global.register_device(device, "GONE", None).await;
        global.set_picker_color(device, Color::new(9, 9, 9)).await;

        painter
            .handle(PointerEvent::Down {
                device,
                row: 1,
                col: 1,
            })
            .await;

        assert_eq!(Color::new(9, 9, 9), cell(&global, device, 1, 1).await);
        assert!(transport.led_buffer("GONE").await.is_none());
    }
}
