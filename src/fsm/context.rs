//! Per-device session context threaded through every lifecycle action.
//!
//! `SessionContext` is the state the lifecycle actions, the dispatcher and
//! the subscription manager read and write: the device reference, the
//! resources of the current bound period, the wired handles and the last
//! decoded values.

use std::rc::Rc;

use log::debug;

use crate::app::ports::{DeviceAddress, DeviceId, DevicePort, ServiceRef};
use crate::codec::Reading;
use crate::codec::location::BodySensorLocation;
use crate::codec::measurement::HeartRateMeasurement;

// ---------------------------------------------------------------------------
// Bound-period resources
// ---------------------------------------------------------------------------

/// Shared handles held for exactly one bound period.
///
/// Acquired when accept starts, dropped when the session leaves the bound
/// period.  Dropping is the release: there is no other path.
pub struct BoundResources<D: DevicePort> {
    db: Rc<D::Db>,
    client: Rc<D::Client>,
}

impl<D: DevicePort> BoundResources<D> {
    pub fn acquire(device: &D) -> Self {
        Self {
            db: device.gatt_db(),
            client: device.gatt_client(),
        }
    }

    pub fn db(&self) -> &Rc<D::Db> {
        &self.db
    }

    pub fn client(&self) -> &Rc<D::Client> {
        &self.client
    }
}

// ---------------------------------------------------------------------------
// Decoded values
// ---------------------------------------------------------------------------

/// Last successfully decoded values.  Survives disconnect; it is simply not
/// updated again until a new bound period wires handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodedState {
    pub measurement: Option<HeartRateMeasurement>,
    pub location: Option<BodySensorLocation>,
}

impl DecodedState {
    pub fn heart_rate(&self) -> Option<u16> {
        self.measurement.map(|m| m.heart_rate)
    }

    pub fn secondary(&self) -> Option<u8> {
        self.measurement.and_then(|m| m.secondary)
    }

    pub fn apply(&mut self, reading: Reading) {
        match reading {
            Reading::HeartRate(m) => self.measurement = Some(m),
            Reading::SensorLocation(l) => self.location = Some(l),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

pub struct SessionContext<D: DevicePort> {
    id: DeviceId,
    address: DeviceAddress,
    /// Daemon-owned device, released when the session is dropped.
    device: Rc<D>,
    /// Present only between the start of accept and the end of the bound period.
    pub(crate) resources: Option<BoundResources<D>>,
    pub(crate) service: Option<ServiceRef>,
    pub(crate) measurement_handle: Option<u16>,
    pub(crate) location_handle: Option<u16>,
    pub(crate) decoded: DecodedState,
    /// Bumped on every acquire and reset; tokens from older periods no longer match.
    pub(crate) generation: u32,
}

impl<D: DevicePort> SessionContext<D> {
    pub fn new(device: Rc<D>) -> Self {
        Self {
            id: device.id(),
            address: device.address(),
            device,
            resources: None,
            service: None,
            measurement_handle: None,
            location_handle: None,
            decoded: DecodedState::default(),
            generation: 0,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn service(&self) -> Option<ServiceRef> {
        self.service
    }

    pub fn measurement_handle(&self) -> Option<u16> {
        self.measurement_handle
    }

    pub fn location_handle(&self) -> Option<u16> {
        self.location_handle
    }

    pub fn decoded(&self) -> &DecodedState {
        &self.decoded
    }

    pub fn has_resources(&self) -> bool {
        self.resources.is_some()
    }

    /// Acquire the bound-period handles from the device and start a new
    /// generation.  Any handles still held are released first.
    pub(crate) fn acquire(&mut self) {
        self.resources = Some(BoundResources::acquire(&*self.device));
        self.generation = self.generation.wrapping_add(1);
    }

    /// Release the bound-period handles and clear everything wired from
    /// them.  Decoded values are left as they are.
    pub(crate) fn reset(&mut self) {
        if self.resources.take().is_some() {
            debug!("HRP ({}): released attribute db and GATT client", self.address);
        }
        self.service = None;
        self.measurement_handle = None;
        self.location_handle = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

impl<D: DevicePort> Drop for SessionContext<D> {
    fn drop(&mut self) {
        debug!("HRP ({}): released device reference", self.address);
    }
}
