//! Lifecycle actions and table builder.
//!
//! ```text
//!  PROBED ──accept──▶ ACCEPTING ──service found──▶ BOUND
//!    ▲                   │                           │
//!    └───no service──────┘                       disconnect
//!                                                    ▼
//!                        ACCEPTING ◀──accept── DISCONNECTED
//!
//!  PROBED | BOUND | DISCONNECTED ──remove──▶ REMOVED
//! ```
//!
//! Entering ACCEPTING acquires the bound-period resources.  Entering
//! PROBED, DISCONNECTED or REMOVED resets them, so whichever way the
//! session leaves ACCEPTING or BOUND the handles are released once.  The
//! device reference itself goes when the removed session is dropped.

use log::{debug, info};

use super::context::SessionContext;
use super::{SessionState, StateDescriptor};
use crate::app::ports::DevicePort;

/// Build the state table for a session over device type `D`.
pub fn build_state_table<D: DevicePort>() -> [StateDescriptor<SessionContext<D>>; SessionState::COUNT]
{
    [
        // Index 0: Unbound
        StateDescriptor {
            id: SessionState::Unbound,
            name: "Unbound",
            on_enter: None,
            on_exit: None,
        },
        // Index 1: Probed
        StateDescriptor {
            id: SessionState::Probed,
            name: "Probed",
            on_enter: Some(probed_enter::<D>),
            on_exit: None,
        },
        // Index 2: Accepting
        StateDescriptor {
            id: SessionState::Accepting,
            name: "Accepting",
            on_enter: Some(accepting_enter::<D>),
            on_exit: None,
        },
        // Index 3: Bound
        StateDescriptor {
            id: SessionState::Bound,
            name: "Bound",
            on_enter: Some(bound_enter::<D>),
            on_exit: Some(bound_exit::<D>),
        },
        // Index 4: Disconnected
        StateDescriptor {
            id: SessionState::Disconnected,
            name: "Disconnected",
            on_enter: Some(disconnected_enter::<D>),
            on_exit: None,
        },
        // Index 5: Removed
        StateDescriptor {
            id: SessionState::Removed,
            name: "Removed",
            on_enter: Some(removed_enter::<D>),
            on_exit: None,
        },
    ]
}

fn probed_enter<D: DevicePort>(ctx: &mut SessionContext<D>) {
    ctx.reset();
    debug!("HRP ({}): probed, waiting for accept", ctx.address());
}

fn accepting_enter<D: DevicePort>(ctx: &mut SessionContext<D>) {
    ctx.acquire();
    debug!(
        "HRP ({}): accepting, generation {}",
        ctx.address(),
        ctx.generation()
    );
}

fn bound_enter<D: DevicePort>(ctx: &mut SessionContext<D>) {
    info!(
        "HRP ({}): bound, measurement={:?} location={:?}",
        ctx.address(),
        ctx.measurement_handle(),
        ctx.location_handle()
    );
}

fn bound_exit<D: DevicePort>(ctx: &mut SessionContext<D>) {
    info!("HRP ({}): leaving bound period", ctx.address());
}

fn disconnected_enter<D: DevicePort>(ctx: &mut SessionContext<D>) {
    ctx.reset();
}

fn removed_enter<D: DevicePort>(ctx: &mut SessionContext<D>) {
    ctx.reset();
    info!("HRP ({}): session removed", ctx.address());
}
