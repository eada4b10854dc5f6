//! Application core: the profile service and its port boundary.
//!
//! Nothing in here talks to a radio.  The daemon's device objects, attribute
//! databases and GATT clients are reached only through the **port traits**
//! in [`ports`], so the service runs unchanged against the simulated peer.

pub mod events;
pub mod ports;
pub mod service;
