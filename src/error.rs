//! Error types for the Heart Rate Profile core.
//!
//! Lifecycle failures ([`ProfileError`]) are returned to the daemon from the
//! entry points.  Everything that goes wrong *inside* a bound session, from a
//! refused read to a truncated notification, is a [`SessionFault`]: logged,
//! reported on the diagnostic sink and otherwise absorbed.  All variants are
//! `Copy` so they can be carried inside events without allocation.

use core::fmt;

use crate::uuid::BtUuid;

// ---------------------------------------------------------------------------
// Crate-wide error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A lifecycle entry point was called out of order.
    Profile(ProfileError),
    /// A characteristic value could not be decoded.
    Decode(DecodeError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(e) => write!(f, "profile: {e}"),
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Lifecycle errors
// ---------------------------------------------------------------------------

/// Returned by the lifecycle entry points for the daemon to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileError {
    /// `bind` was called for a device that already has a session.
    AlreadyProbed,
    /// `accept` was called for a device that was never bound.
    NotProbed,
    /// The peer exposes no Heart Rate service.
    ServiceNotFound,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyProbed => write!(f, "profile probed twice for the same device"),
            Self::NotProbed => write!(f, "device not handled by profile"),
            Self::ServiceNotFound => write!(f, "heart rate service not found"),
        }
    }
}

impl From<ProfileError> for Error {
    fn from(e: ProfileError) -> Self {
        Self::Profile(e)
    }
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Zero-length value.
    Empty,
    /// The flags announce more bytes than the value carries.
    Truncated,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty value"),
            Self::Truncated => write!(f, "value truncated"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// ATT protocol error codes
// ---------------------------------------------------------------------------

/// An ATT error code as reported by the remote GATT server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttError(pub u8);

impl AttError {
    pub const INVALID_HANDLE: Self = Self(0x01);
    pub const READ_NOT_PERMITTED: Self = Self(0x02);
    pub const WRITE_NOT_PERMITTED: Self = Self(0x03);
    pub const INSUFFICIENT_AUTHENTICATION: Self = Self(0x05);
    pub const REQUEST_NOT_SUPPORTED: Self = Self(0x06);
    pub const INSUFFICIENT_ENCRYPTION: Self = Self(0x0F);
    pub const UNLIKELY: Self = Self(0x0E);
    pub const CCC_IMPROPERLY_CONFIGURED: Self = Self(0xFD);

    pub const fn code(self) -> u8 {
        self.0
    }

    /// Human-readable name of the code.
    pub const fn as_str(self) -> &'static str {
        match self.0 {
            0x01 => "Invalid Handle",
            0x02 => "Read Not Permitted",
            0x03 => "Write Not Permitted",
            0x04 => "Invalid PDU",
            0x05 => "Authentication Required",
            0x06 => "Request Not Supported",
            0x07 => "Invalid Offset",
            0x08 => "Authorization Required",
            0x09 => "Prepare Write Queue Full",
            0x0A => "Attribute Not Found",
            0x0B => "Attribute Not Long",
            0x0C => "Insufficient Encryption Key Size",
            0x0D => "Invalid Attribute Value Length",
            0x0E => "Unlikely Error",
            0x0F => "Encryption Required",
            0x10 => "Unsupported Group Type",
            0x11 => "Insufficient Resources",
            0xFD => "CCC Improperly Configured",
            0xFE => "Procedure Already in Progress",
            0xFF => "Out of Range",
            _ => "Unknown error type",
        }
    }
}

impl fmt::Display for AttError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.as_str(), self.0)
    }
}

// ---------------------------------------------------------------------------
// Session faults (non-fatal)
// ---------------------------------------------------------------------------

/// Non-fatal conditions detected while a session is bound.
///
/// None of these abort the session.  `DanglingNotification` is the exception
/// in severity: it means the completion wiring is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFault {
    /// A second Heart Rate service instance was found and ignored.
    DuplicateServiceIgnored,
    /// A characteristic under the service is not one we know.
    UnrecognizedCharacteristic(BtUuid),
    /// The attribute database could not describe a characteristic.
    CharacteristicDataUnavailable,
    /// The GATT client refused to queue a request.
    RequestNotSent { handle: u16 },
    /// The remote read failed; the subscribe step was abandoned.
    RemoteReadFailed { handle: u16, error: AttError },
    /// Writing the client characteristic configuration failed.
    RemoteSubscribeFailed { handle: u16, error: AttError },
    /// A value arrived but could not be decoded.
    Decode { handle: u16, error: DecodeError },
    /// A completion arrived for a session that is gone or was reset.
    StrayCallback { handle: u16 },
    /// A notification arrived for a handle that was never wired.
    DanglingNotification { handle: u16 },
    /// Completions for the handle were refused by a full completion queue.
    CompletionsDropped { handle: u16, count: u32 },
}

impl fmt::Display for SessionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateServiceIgnored => {
                write!(f, "more than one heart rate service, extra ignored")
            }
            Self::UnrecognizedCharacteristic(uuid) => {
                write!(f, "unsupported characteristic {uuid}")
            }
            Self::CharacteristicDataUnavailable => {
                write!(f, "failed to obtain characteristic data")
            }
            Self::RequestNotSent { handle } => {
                write!(f, "request for handle 0x{handle:04x} not sent")
            }
            Self::RemoteReadFailed { handle, error } => {
                write!(f, "read of handle 0x{handle:04x} failed: {error}")
            }
            Self::RemoteSubscribeFailed { handle, error } => {
                write!(f, "notifications on 0x{handle:04x} not enabled: {error}")
            }
            Self::Decode { handle, error } => {
                write!(f, "value on 0x{handle:04x} not decoded: {error}")
            }
            Self::StrayCallback { handle } => {
                write!(f, "stray completion for handle 0x{handle:04x}")
            }
            Self::DanglingNotification { handle } => {
                write!(f, "notification for unwired handle 0x{handle:04x}")
            }
            Self::CompletionsDropped { handle, count } => {
                write!(f, "{count} completion(s) for 0x{handle:04x} dropped, queue full")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
