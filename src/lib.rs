//! `ledboard` is the control core for serpentine-wired addressable RGB LED
//! boards: a 22×8 matrix per device, reachable only through a small set of
//! named backend commands.
//!
//! The crate covers the LED addressing math, the interactive paint state
//! machine, the per-device registry that routes commands to the correct
//! physical unit, the layout save/load codec, image projection feedback and
//! the periodic connection poller. The hardware side sits behind the
//! [`transport::Transport`] trait; [`transport::sim::SimTransport`] provides
//! an in-memory board for development and tests.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod control;
pub mod global;
pub mod layout;
pub mod matrix;
pub mod models;
pub mod paint;
pub mod poller;
pub mod projector;
pub mod registry;
pub mod transport;
