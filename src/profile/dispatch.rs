//! Characteristic dispatcher.
//!
//! Maps one discovered characteristic of the bound service onto the flow
//! that handles it.  Unknown characteristics are reported and skipped;
//! discovery is never aborted from here.

use log::{debug, error};

use crate::app::events::ProfileEvent;
use crate::app::ports::{AttributeDb, CharacteristicRef, DevicePort, EventSink};
use crate::config::{ProfileConfig, SubscriptionFlow};
use crate::error::SessionFault;
use crate::fsm::context::SessionContext;
use crate::uuid::{BODY_SENSOR_LOCATION, BtUuid, HEART_RATE_CONTROL_POINT, HEART_RATE_MEASUREMENT};

use super::completion::Purpose;
use super::subscription;

/// What the profile does with a characteristic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacteristicRole {
    /// Heart Rate Measurement: subscribed, optionally read first.
    Measurement,
    /// Body Sensor Location: read, then subscribed.
    SensorLocation,
    /// Heart Rate Control Point: known, left alone.
    ControlPoint,
    Unrecognized,
}

impl CharacteristicRole {
    pub fn classify(uuid: BtUuid) -> Self {
        match uuid {
            HEART_RATE_MEASUREMENT => Self::Measurement,
            BODY_SENSOR_LOCATION => Self::SensorLocation,
            HEART_RATE_CONTROL_POINT => Self::ControlPoint,
            _ => Self::Unrecognized,
        }
    }
}

/// Look up `attr` in `db` and dispatch it.  A declaration the database
/// cannot describe is logged and skipped.
pub(crate) fn handle_characteristic<D: DevicePort>(
    db: &D::Db,
    attr: CharacteristicRef,
    ctx: &mut SessionContext<D>,
    config: &ProfileConfig,
    sink: &mut impl EventSink,
) {
    let Some(data) = db.characteristic_data(attr) else {
        error!("HRP ({}): failed to obtain characteristic data", ctx.address());
        sink.emit(&ProfileEvent::Fault {
            device: ctx.id(),
            fault: SessionFault::CharacteristicDataUnavailable,
        });
        return;
    };
    dispatch(data.uuid, data.value_handle, ctx, config, sink);
}

/// Wire `value_handle` according to the characteristic type and start its
/// flow.  A repeated characteristic overwrites the earlier handle.
pub fn dispatch<D: DevicePort>(
    uuid: BtUuid,
    value_handle: u16,
    ctx: &mut SessionContext<D>,
    config: &ProfileConfig,
    sink: &mut impl EventSink,
) -> CharacteristicRole {
    let role = CharacteristicRole::classify(uuid);
    match role {
        CharacteristicRole::Measurement => {
            ctx.measurement_handle = Some(value_handle);
            subscription::start(
                ctx,
                value_handle,
                Purpose::Measurement,
                config.measurement_flow,
                sink,
            );
        }
        CharacteristicRole::SensorLocation => {
            ctx.location_handle = Some(value_handle);
            subscription::start(
                ctx,
                value_handle,
                Purpose::SensorLocation,
                SubscriptionFlow::ReadThenSubscribe,
                sink,
            );
        }
        CharacteristicRole::ControlPoint => {
            debug!(
                "HRP ({}): control point at 0x{value_handle:04x} not handled",
                ctx.address()
            );
        }
        CharacteristicRole::Unrecognized => {
            debug!("HRP ({}): unsupported characteristic {uuid}", ctx.address());
            sink.emit(&ProfileEvent::Fault {
                device: ctx.id(),
                fault: SessionFault::UnrecognizedCharacteristic(uuid),
            });
        }
    }
    role
}
