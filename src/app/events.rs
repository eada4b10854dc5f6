//! Outbound profile events.
//!
//! The [`ProfileService`](super::service::ProfileService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  They carry lifecycle
//! results for the daemon's connection bookkeeping and the non-fatal faults
//! that would otherwise only show up as missing values.

use crate::error::{ProfileError, SessionFault};

use super::ports::DeviceId;

/// Structured events emitted by the profile core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    /// A session was created for the device.
    Probed(DeviceId),

    /// Accept finished; `Ok` means discovery ran and requests were issued.
    ConnectingComplete {
        device: DeviceId,
        result: Result<(), ProfileError>,
    },

    /// Disconnect finished.  Always succeeds.
    DisconnectingComplete(DeviceId),

    /// The session was destroyed.
    Removed(DeviceId),

    /// A non-fatal fault inside a session.
    Fault {
        device: DeviceId,
        fault: SessionFault,
    },
}
