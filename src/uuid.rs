//! Bluetooth UUIDs used by the Heart Rate Profile.
//!
//! Every identifier is held as a full 128-bit value.  16-bit assigned
//! numbers are expanded onto the Bluetooth base UUID
//! (`0000xxxx-0000-1000-8000-00805F9B34FB`) so that services and
//! characteristics are always compared numerically, whatever width the
//! peer advertised them with.

use core::fmt;

/// Bluetooth base UUID with the 16-bit slot zeroed.
const BASE_UUID: u128 = 0x0000_0000_0000_1000_8000_0080_5f9b_34fb;

/// Bit offset of the 16/32-bit short form inside the 128-bit value.
const SHORT_SHIFT: u32 = 96;

/// A 128-bit Bluetooth UUID.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BtUuid(u128);

impl BtUuid {
    /// Wrap a full 128-bit UUID.
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Expand a 16-bit assigned number onto the base UUID.
    pub const fn from_u16(short: u16) -> Self {
        Self(BASE_UUID | ((short as u128) << SHORT_SHIFT))
    }

    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// The 16-bit assigned number, if this UUID lies on the base UUID.
    pub const fn as_u16(self) -> Option<u16> {
        let short_mask = (0xFFFF_FFFF_u128) << SHORT_SHIFT;
        let rest = self.0 & !short_mask;
        let upper = self.0 >> (SHORT_SHIFT + 16);
        if rest == BASE_UUID && upper == 0 {
            Some((self.0 >> SHORT_SHIFT) as u16)
        } else {
            None
        }
    }
}

impl fmt::Display for BtUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF
        )
    }
}

impl fmt::Debug for BtUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_u16() {
            Some(short) => write!(f, "BtUuid(0x{short:04x})"),
            None => write!(f, "BtUuid({self})"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Heart Rate Profile assigned numbers
// ───────────────────────────────────────────────────────────────

/// Heart Rate service.
pub const HEART_RATE_SERVICE: BtUuid = BtUuid::from_u16(0x180D);
/// Heart Rate Measurement characteristic (notify).
pub const HEART_RATE_MEASUREMENT: BtUuid = BtUuid::from_u16(0x2A37);
/// Body Sensor Location characteristic (read).
pub const BODY_SENSOR_LOCATION: BtUuid = BtUuid::from_u16(0x2A38);
/// Heart Rate Control Point characteristic (write).
pub const HEART_RATE_CONTROL_POINT: BtUuid = BtUuid::from_u16(0x2A39);
