//! Heart Rate Measurement decoder.
//!
//! Value layout:
//! ```text
//! ┌────────┬──────────────────┬───────────────┬─────────────────────┐
//! │ Flags  │ Heart rate       │ Secondary     │ Trailer             │
//! │ (1B)   │ u8, or u16 LE    │ u8 (optional) │ (optional, opaque)  │
//! └────────┴──────────────────┴───────────────┴─────────────────────┘
//!
//! Flags (LSB first):
//!   bit 0    value format     0 = u8, 1 = u16 LE
//!   bit 1-2  sensor contact   0/1 unsupported, 2 not detected, 3 detected
//!   bit 3    secondary value present
//!   bit 4    trailer present
//!   bit 5-7  reserved
//! ```
//!
//! The decoder is a pure function: identical input gives identical output.

use crate::error::DecodeError;

const FLAG_FORMAT_U16: u8 = 0b0000_0001;
const FLAG_CONTACT_MASK: u8 = 0b0000_0110;
const FLAG_CONTACT_SHIFT: u8 = 1;
const FLAG_SECONDARY: u8 = 0b0000_1000;
const FLAG_TRAILER: u8 = 0b0001_0000;

/// Width of the heart-rate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    U8,
    U16,
}

/// Sensor contact status from flag bits 1-2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorContact {
    /// The sensor does not report contact.
    Unsupported,
    /// Supported, but the sensor is not touching skin.
    NotDetected,
    /// Supported and detected.
    Detected,
}

impl SensorContact {
    fn from_flags(flags: u8) -> Self {
        match (flags & FLAG_CONTACT_MASK) >> FLAG_CONTACT_SHIFT {
            2 => Self::NotDetected,
            3 => Self::Detected,
            _ => Self::Unsupported,
        }
    }
}

/// One decoded Heart Rate Measurement value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartRateMeasurement {
    pub format: ValueFormat,
    /// Beats per minute.
    pub heart_rate: u16,
    /// Present when flag bit 3 is set.
    pub secondary: Option<u8>,
    pub contact: SensorContact,
    /// Flag bit 4.  The trailer bytes themselves are not interpreted.
    pub trailer_present: bool,
}

/// Decode a Heart Rate Measurement value.
pub fn decode(bytes: &[u8]) -> Result<HeartRateMeasurement, DecodeError> {
    let (&flags, rest) = bytes.split_first().ok_or(DecodeError::Empty)?;

    let (format, heart_rate, rest) = if flags & FLAG_FORMAT_U16 == 0 {
        let (&value, rest) = rest.split_first().ok_or(DecodeError::Truncated)?;
        (ValueFormat::U8, u16::from(value), rest)
    } else {
        let (value, rest) = rest
            .split_first_chunk::<2>()
            .ok_or(DecodeError::Truncated)?;
        (ValueFormat::U16, u16::from_le_bytes(*value), rest)
    };

    let secondary = if flags & FLAG_SECONDARY == 0 {
        None
    } else {
        let &value = rest.first().ok_or(DecodeError::Truncated)?;
        Some(value)
    };

    Ok(HeartRateMeasurement {
        format,
        heart_rate,
        secondary,
        contact: SensorContact::from_flags(flags),
        trailer_present: flags & FLAG_TRAILER != 0,
    })
}
