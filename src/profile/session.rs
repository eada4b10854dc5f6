//! One device's profile session.
//!
//! A [`Session`] pairs the lifecycle engine with the context it drives.
//! It is created on bind, discovers and wires the Heart Rate service on
//! accept, handles completions while bound, and is dropped on remove.

use std::rc::Rc;

use log::{debug, error, info, warn};

use crate::app::events::ProfileEvent;
use crate::app::ports::{AttributeDb, DevicePort, EventSink, ServiceRef};
use crate::config::ProfileConfig;
use crate::error::{ProfileError, SessionFault};
use crate::fsm::context::{DecodedState, SessionContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, SessionState};
use crate::uuid::HEART_RATE_SERVICE;

use super::completion::{Completion, Purpose, RequestToken};
use super::{dispatch, subscription};

pub struct Session<D: DevicePort> {
    lifecycle: Fsm<SessionContext<D>>,
    ctx: SessionContext<D>,
}

impl<D: DevicePort> Session<D> {
    /// Create the session for `device` and move it to PROBED.
    pub(crate) fn probe(device: Rc<D>) -> Self {
        let mut session = Self {
            lifecycle: Fsm::new(build_state_table::<D>(), SessionState::Unbound),
            ctx: SessionContext::new(device),
        };
        session
            .lifecycle
            .transition(SessionState::Probed, &mut session.ctx);
        session
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle.current_state()
    }

    pub fn context(&self) -> &SessionContext<D> {
        &self.ctx
    }

    pub fn decoded(&self) -> &DecodedState {
        self.ctx.decoded()
    }

    /// Number of lifecycle transitions taken since bind.
    pub fn transition_count(&self) -> u32 {
        self.lifecycle.transition_count()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Discover the Heart Rate service and start every characteristic
    /// flow.  Returns once the requests are issued.
    ///
    /// Without a service the session goes back to where it came from,
    /// with the handles acquired for this attempt released.
    pub(crate) fn accept(
        &mut self,
        config: &ProfileConfig,
        sink: &mut impl EventSink,
    ) -> Result<(), ProfileError> {
        if self.state() == SessionState::Bound {
            info!(
                "HRP ({}): accept while bound, ending previous period",
                self.ctx.address()
            );
            self.lifecycle
                .transition(SessionState::Disconnected, &mut self.ctx);
        }

        let origin = self.state();
        if !self
            .lifecycle
            .transition(SessionState::Accepting, &mut self.ctx)
        {
            return Err(ProfileError::NotProbed);
        }

        if self.discover(config, sink).is_none() {
            error!("HRP ({}): HRP attribute not found", self.ctx.address());
            self.lifecycle.transition(origin, &mut self.ctx);
            return Err(ProfileError::ServiceNotFound);
        }

        self.lifecycle.transition(SessionState::Bound, &mut self.ctx);
        Ok(())
    }

    /// Walk the attribute database: bind the first Heart Rate service,
    /// report any further instance, and dispatch every characteristic of
    /// the bound one.
    fn discover(&mut self, config: &ProfileConfig, sink: &mut impl EventSink) -> Option<ServiceRef> {
        let db = Rc::clone(self.ctx.resources.as_ref()?.db());
        let device = self.ctx.id();
        let address = self.ctx.address();

        let mut found = None;
        db.foreach_service(HEART_RATE_SERVICE, &mut |service| {
            if found.is_some() {
                error!("HRP ({address}): more than one HRP service exists for this device");
                sink.emit(&ProfileEvent::Fault {
                    device,
                    fault: SessionFault::DuplicateServiceIgnored,
                });
                return;
            }
            found = Some(service);
        });
        let service = found?;
        self.ctx.service = Some(service);

        let ctx = &mut self.ctx;
        db.foreach_characteristic(service, &mut |attr| {
            dispatch::handle_characteristic(&*db, attr, ctx, config, sink);
        });
        Some(service)
    }

    /// End the bound period.  Anything other than BOUND has nothing to
    /// release and is left as it is.
    pub(crate) fn disconnect(&mut self) {
        if self.state() == SessionState::Bound {
            self.lifecycle
                .transition(SessionState::Disconnected, &mut self.ctx);
        } else {
            debug!(
                "HRP ({}): disconnect in {:?}, nothing to release",
                self.ctx.address(),
                self.state()
            );
        }
    }

    /// Move to REMOVED.  The caller drops the session afterwards, which
    /// releases the device reference.
    pub(crate) fn remove(&mut self) {
        self.lifecycle
            .transition(SessionState::Removed, &mut self.ctx);
    }

    // ── Completions ───────────────────────────────────────────

    /// Route a completion to the flow that issued it.  Completions from an
    /// earlier bound period, arriving outside one, or issued for a handle
    /// that a repeated characteristic has since replaced, are dropped.
    pub(crate) fn handle_completion(&mut self, completion: Completion, sink: &mut impl EventSink) {
        let token = *completion.token();
        if let Some(reason) = self.stray_reason(&token) {
            let handle = completion.handle();
            warn!(
                "HRP ({}): dropping stray completion for 0x{handle:04x}: {reason}",
                self.ctx.address()
            );
            sink.emit(&ProfileEvent::Fault {
                device: self.ctx.id(),
                fault: SessionFault::StrayCallback { handle },
            });
            return;
        }

        match completion {
            Completion::Read { token, result } => {
                subscription::on_read(&mut self.ctx, token, result, sink);
            }
            Completion::NotifyRegistered { token, status } => {
                subscription::on_notify_registered(&self.ctx, token, status, sink);
            }
            Completion::Notification { handle, value, .. } => {
                subscription::on_notification(&mut self.ctx, handle, &value, sink);
            }
        }
    }

    fn stray_reason(&self, token: &RequestToken) -> Option<&'static str> {
        if self.state() != SessionState::Bound {
            return Some("session not bound");
        }
        if token.generation != self.ctx.generation() {
            return Some("earlier bound period");
        }
        let wired = match token.purpose {
            Purpose::Measurement => self.ctx.measurement_handle(),
            Purpose::SensorLocation => self.ctx.location_handle(),
        };
        if wired != Some(token.handle) {
            return Some("handle superseded by a repeated characteristic");
        }
        None
    }
}
