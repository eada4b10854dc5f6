//! Bluetooth LE Heart Rate Profile session handler.
//!
//! Discovers the Heart Rate service on a connected peer, subscribes to its
//! measurement and sensor-location characteristics, decodes the values and
//! keeps per-device session state across connect/disconnect cycles.  The
//! host daemon is reached only through the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod codec;
pub mod config;
pub mod error;
pub mod fsm;
pub mod profile;
pub mod uuid;
