//! The connection poller.
//!
//! Once per interval, every registered device is checked for liveness and
//! its temperature readings refreshed. Devices are polled one at a time; a
//! single device failing its check is logged and skipped, never stopping
//! the sweep or unregistering the device. Sweeps are not guarded against
//! overlapping the next tick.

use std::sync::Arc;
use std::time::Duration;

use crate::global::{Event, Global};
use crate::transport::Transport;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

pub struct Poller {
    global: Global,
    transport: Arc<dyn Transport>,
    interval: Duration,
}

impl Poller {
    pub fn new(global: Global, transport: Arc<dyn Transport>) -> Self {
        Self {
            global,
            transport,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll every registered device once, sequentially
    #[instrument(skip(self))]
    pub async fn sweep(&self) {
        for device in self.global.device_ids().await {
            let serial_number = match self.global.serial_number(device).await {
                Some(serial_number) => serial_number,
                None => {
                    self.global
                        .publish(Event::Connection {
                            device,
                            connected: false,
                        })
                        .await;
                    continue;
                }
            };

            let connected = match self.transport.connect(&serial_number).await {
                Ok(connected) => connected,
                Err(error) => {
                    debug!(device = %device, error = %error, "connection check failed");
                    false
                }
            };

            self.global
                .publish(Event::Connection { device, connected })
                .await;

            if !connected {
                continue;
            }

            match self.transport.temperatures(&serial_number).await {
                Ok(readings) => {
                    self.global
                        .publish(Event::Temperatures { device, readings })
                        .await;
                }
                Err(error) => {
                    error!(device = %device, error = %error, "reading temperatures failed");
                }
            }
        }
    }

    /// Run the poll loop forever
    pub async fn run(self) {
        let mut ticks = tokio::time::interval(self.interval);

        loop {
            ticks.tick().await;
            trace!("poll tick");
            self.sweep().await;
        }
    }
}
