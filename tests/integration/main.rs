//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the profile service
//! against the simulated peer.  Everything runs on the host with no radio.

mod lifecycle_tests;
mod peer;
