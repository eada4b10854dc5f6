//! Port traits: the hexagonal boundary between the profile core and the
//! host Bluetooth daemon.
//!
//! ```text
//!   Daemon adapter ──▶ Port trait ──▶ ProfileService (domain)
//! ```
//!
//! The daemon's device object, its attribute database and its GATT client
//! implement these traits.  [`ProfileService`](super::service::ProfileService)
//! consumes them via generics, so the core never touches the radio stack.
//!
//! Everything here lives on the daemon's single event-loop thread; shared
//! handles are `Rc`, never `Arc`.

use core::fmt;
use std::rc::Rc;

use crate::profile::completion::RequestToken;
use crate::uuid::BtUuid;

// ───────────────────────────────────────────────────────────────
// Identity
// ───────────────────────────────────────────────────────────────

/// Stable key the daemon uses for one remote device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dev#{}", self.0)
    }
}

/// Bluetooth device address, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress(pub [u8; 6]);

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

// ───────────────────────────────────────────────────────────────
// Device port (driven adapter: daemon device object)
// ───────────────────────────────────────────────────────────────

/// A remote device known to the daemon.
///
/// The daemon owns the device; a session holds an `Rc` to it between
/// bind and remove.
pub trait DevicePort {
    type Db: AttributeDb;
    type Client: GattClient;

    fn id(&self) -> DeviceId;

    fn address(&self) -> DeviceAddress;

    /// The device's discovered attribute database.
    fn gatt_db(&self) -> Rc<Self::Db>;

    /// The GATT client for the current connection.
    fn gatt_client(&self) -> Rc<Self::Client>;
}

// ───────────────────────────────────────────────────────────────
// Attribute database port
// ───────────────────────────────────────────────────────────────

/// Reference to a service declaration inside an attribute database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceRef(pub u16);

/// Reference to a characteristic declaration inside an attribute database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacteristicRef(pub u16);

/// What the profile needs to know about one characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicData {
    pub value_handle: u16,
    pub uuid: BtUuid,
}

/// Read-only view of a peer's discovered attributes.
pub trait AttributeDb {
    /// Call `f` for every primary service whose UUID equals `uuid`, in
    /// handle order.
    fn foreach_service(&self, uuid: BtUuid, f: &mut dyn FnMut(ServiceRef));

    /// Call `f` for every characteristic declared under `service`.
    fn foreach_characteristic(&self, service: ServiceRef, f: &mut dyn FnMut(CharacteristicRef));

    /// Value handle and type of a characteristic, or `None` if the
    /// declaration is malformed.
    fn characteristic_data(&self, attr: CharacteristicRef) -> Option<CharacteristicData>;
}

// ───────────────────────────────────────────────────────────────
// GATT client port
// ───────────────────────────────────────────────────────────────

/// Registration id returned by [`GattClient::register_notify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotifyId(pub u32);

/// Non-blocking GATT client.
///
/// Requests return immediately.  Results arrive later as
/// [`Completion`](crate::profile::completion::Completion) values carrying
/// the `token` passed here, never from inside the call itself.
pub trait GattClient {
    /// Queue a read of `handle`.  Returns `false` if the request could
    /// not be queued; no completion follows in that case.
    fn read_value(&self, handle: u16, token: RequestToken) -> bool;

    /// Enable notifications on `handle`.  One `NotifyRegistered`
    /// completion follows, then a `Notification` per value pushed by the
    /// peer.  Returns `None` if the request could not be queued.
    fn register_notify(&self, handle: u16, token: RequestToken) -> Option<NotifyId>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / daemon)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`ProfileEvent`](super::events::ProfileEvent)s
/// through this port.  Fire-and-forget.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::ProfileEvent);
}
