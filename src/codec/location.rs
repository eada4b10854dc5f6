//! Body Sensor Location decoder: a one-byte code mapped to a fixed label.

use core::fmt;

use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySensorLocation {
    Other,
    Chest,
    Wrist,
    Finger,
    Hand,
    EarLobe,
    Foot,
    /// Any code outside the assigned table.
    Unknown(u8),
}

impl BodySensorLocation {
    pub const fn from_raw(code: u8) -> Self {
        match code {
            0 => Self::Other,
            1 => Self::Chest,
            2 => Self::Wrist,
            3 => Self::Finger,
            4 => Self::Hand,
            5 => Self::EarLobe,
            6 => Self::Foot,
            other => Self::Unknown(other),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Other => "Other",
            Self::Chest => "Chest",
            Self::Wrist => "Wrist",
            Self::Finger => "Finger",
            Self::Hand => "Hand",
            Self::EarLobe => "Ear Lobe",
            Self::Foot => "Foot",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for BodySensorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decode a Body Sensor Location value.  Only the first byte is significant.
pub fn decode(bytes: &[u8]) -> Result<BodySensorLocation, DecodeError> {
    bytes
        .first()
        .map(|&code| BodySensorLocation::from_raw(code))
        .ok_or(DecodeError::Empty)
}
