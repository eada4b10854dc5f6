//! Read and subscribe flows, and the handlers for their completions.
//!
//! ```text
//!  ReadThenSubscribe:  read ──▶ on_read ──(non-empty)──▶ subscribe
//!  SubscribeOnly:                                        subscribe
//!                                                            │
//!                              on_notify_registered ◀────────┤
//!                              on_notification      ◀────────┘ (per value)
//! ```
//!
//! Nothing here retries.  A failed step is reported on the sink and the
//! flow for that characteristic ends.

use std::rc::Rc;

use log::{debug, error, warn};

use crate::app::events::ProfileEvent;
use crate::app::ports::{DevicePort, EventSink, GattClient};
use crate::codec::{AttValue, MeasurementPayload};
use crate::config::SubscriptionFlow;
use crate::error::{AttError, SessionFault};
use crate::fsm::context::SessionContext;

use super::completion::{Purpose, RequestToken};

fn emit_fault<D: DevicePort>(ctx: &SessionContext<D>, sink: &mut impl EventSink, fault: SessionFault) {
    sink.emit(&ProfileEvent::Fault {
        device: ctx.id(),
        fault,
    });
}

fn token<D: DevicePort>(ctx: &SessionContext<D>, handle: u16, purpose: Purpose) -> RequestToken {
    RequestToken {
        device: ctx.id(),
        generation: ctx.generation(),
        handle,
        purpose,
    }
}

/// The client of the current bound period.  Outside one there is nothing
/// to issue requests on, which is reported as a stray call.
fn client<D: DevicePort>(
    ctx: &SessionContext<D>,
    handle: u16,
    sink: &mut impl EventSink,
) -> Option<Rc<D::Client>> {
    match ctx.resources.as_ref() {
        Some(res) => Some(Rc::clone(res.client())),
        None => {
            warn!(
                "HRP ({}): no GATT client for handle 0x{handle:04x}",
                ctx.address()
            );
            emit_fault(ctx, sink, SessionFault::StrayCallback { handle });
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Issuing
// ---------------------------------------------------------------------------

/// Begin the flow for one wired characteristic.
pub(crate) fn start<D: DevicePort>(
    ctx: &mut SessionContext<D>,
    handle: u16,
    purpose: Purpose,
    flow: SubscriptionFlow,
    sink: &mut impl EventSink,
) {
    match flow {
        SubscriptionFlow::ReadThenSubscribe => read(ctx, handle, purpose, sink),
        SubscriptionFlow::SubscribeOnly => subscribe(ctx, handle, purpose, sink),
    }
}

fn read<D: DevicePort>(
    ctx: &SessionContext<D>,
    handle: u16,
    purpose: Purpose,
    sink: &mut impl EventSink,
) {
    let Some(client) = client(ctx, handle, sink) else {
        return;
    };
    if !client.read_value(handle, token(ctx, handle, purpose)) {
        warn!("HRP ({}): failed to send request to read {purpose}", ctx.address());
        emit_fault(ctx, sink, SessionFault::RequestNotSent { handle });
    }
}

fn subscribe<D: DevicePort>(
    ctx: &SessionContext<D>,
    handle: u16,
    purpose: Purpose,
    sink: &mut impl EventSink,
) {
    let Some(client) = client(ctx, handle, sink) else {
        return;
    };
    match client.register_notify(handle, token(ctx, handle, purpose)) {
        Some(id) => debug!(
            "HRP ({}): {purpose} notify registration {} pending",
            ctx.address(),
            id.0
        ),
        None => {
            warn!("HRP ({}): failed to register for {purpose}", ctx.address());
            emit_fault(ctx, sink, SessionFault::RequestNotSent { handle });
        }
    }
}

// ---------------------------------------------------------------------------
// Completions
// ---------------------------------------------------------------------------

/// Read finished.  A non-empty value is decoded and stored, then the same
/// handle is subscribed.  A failed read or an empty value ends the flow.
pub(crate) fn on_read<D: DevicePort>(
    ctx: &mut SessionContext<D>,
    token: RequestToken,
    result: Result<AttValue, AttError>,
    sink: &mut impl EventSink,
) {
    let handle = token.handle;
    let value = match result {
        Ok(value) => value,
        Err(error) => {
            debug!(
                "HRP ({}): reading {} failed with ATT error: {error}",
                ctx.address(),
                token.purpose
            );
            emit_fault(ctx, sink, SessionFault::RemoteReadFailed { handle, error });
            return;
        }
    };

    if value.is_empty() {
        debug!(
            "HRP ({}): {} read returned no data, not subscribing",
            ctx.address(),
            token.purpose
        );
        return;
    }

    store(ctx, handle, token.purpose, &value, sink);
    subscribe(ctx, handle, token.purpose, sink);
}

/// The client characteristic configuration write finished.
pub(crate) fn on_notify_registered<D: DevicePort>(
    ctx: &SessionContext<D>,
    token: RequestToken,
    status: u8,
    sink: &mut impl EventSink,
) {
    if status != 0 {
        let error = AttError(status);
        warn!(
            "HRP ({}): failed to enable {} notifications: {error}",
            ctx.address(),
            token.purpose
        );
        emit_fault(
            ctx,
            sink,
            SessionFault::RemoteSubscribeFailed {
                handle: token.handle,
                error,
            },
        );
        return;
    }
    debug!("HRP ({}): {} notifications enabled", ctx.address(), token.purpose);
}

/// The peer pushed a value.  Routed by handle, not by the token.
pub(crate) fn on_notification<D: DevicePort>(
    ctx: &mut SessionContext<D>,
    handle: u16,
    value: &[u8],
    sink: &mut impl EventSink,
) {
    let purpose = if ctx.measurement_handle == Some(handle) {
        Purpose::Measurement
    } else if ctx.location_handle == Some(handle) {
        Purpose::SensorLocation
    } else {
        error!(
            "HRP ({}): notification for unwired handle 0x{handle:04x}",
            ctx.address()
        );
        emit_fault(ctx, sink, SessionFault::DanglingNotification { handle });
        debug_assert!(false, "notification for unwired handle 0x{handle:04x}");
        return;
    };
    store(ctx, handle, purpose, value, sink);
}

fn store<D: DevicePort>(
    ctx: &mut SessionContext<D>,
    handle: u16,
    purpose: Purpose,
    bytes: &[u8],
    sink: &mut impl EventSink,
) {
    let payload = match purpose {
        Purpose::Measurement => MeasurementPayload::HeartRate(bytes),
        Purpose::SensorLocation => MeasurementPayload::SensorLocation(bytes),
    };
    match payload.decode() {
        Ok(reading) => {
            debug!("HRP ({}): {purpose} {reading:?}", ctx.address());
            ctx.decoded.apply(reading);
        }
        Err(error) => {
            warn!(
                "HRP ({}): {purpose} value on 0x{handle:04x} not decoded: {error}",
                ctx.address()
            );
            emit_fault(ctx, sink, SessionFault::Decode { handle, error });
        }
    }
}
