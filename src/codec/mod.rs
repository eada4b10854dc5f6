//! Characteristic value decoders.
//!
//! ```text
//!   Completion (AttValue) ──▶ MeasurementPayload ──▶ decode() ──▶ Reading
//!                              (tagged by role)
//! ```
//!
//! Raw attribute values are never passed around as bare byte slices past
//! this point: a [`MeasurementPayload`] names which characteristic the
//! bytes came from, so the right decoder is chosen by its tag.

pub mod location;
pub mod measurement;

use crate::error::DecodeError;
use location::BodySensorLocation;
use measurement::HeartRateMeasurement;

/// Largest attribute value ATT allows.
pub const MAX_ATT_VALUE_LEN: usize = 512;

/// A bounded attribute value as delivered by a read or a notification.
pub type AttValue = heapless::Vec<u8, MAX_ATT_VALUE_LEN>;

/// Raw bytes tagged with the characteristic they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementPayload<'a> {
    HeartRate(&'a [u8]),
    SensorLocation(&'a [u8]),
}

impl MeasurementPayload<'_> {
    pub fn decode(&self) -> Result<Reading, DecodeError> {
        match *self {
            Self::HeartRate(b) => measurement::decode(b).map(Reading::HeartRate),
            Self::SensorLocation(b) => location::decode(b).map(Reading::SensorLocation),
        }
    }
}

/// A successfully decoded characteristic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    HeartRate(HeartRateMeasurement),
    SensorLocation(BodySensorLocation),
}
