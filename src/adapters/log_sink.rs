//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every [`ProfileEvent`] as one line
//! through the `log` facade.  The daemon's own bookkeeping adapter would
//! implement the same trait.

use log::{info, warn};

use crate::app::events::ProfileEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`ProfileEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ProfileEvent) {
        match event {
            ProfileEvent::Probed(device) => {
                info!("PROBE | {}", device);
            }
            ProfileEvent::ConnectingComplete { device, result } => match result {
                Ok(()) => info!("ACCEPT | {} | ok", device),
                Err(e) => warn!("ACCEPT | {} | failed: {}", device, e),
            },
            ProfileEvent::DisconnectingComplete(device) => {
                info!("DISCONNECT | {}", device);
            }
            ProfileEvent::Removed(device) => {
                info!("REMOVE | {}", device);
            }
            ProfileEvent::Fault { device, fault } => {
                warn!("FAULT | {} | {}", device, fault);
            }
        }
    }
}
