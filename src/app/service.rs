//! Profile service, the hexagonal core.
//!
//! [`ProfileService`] owns every device session and the profile
//! configuration.  The daemon drives it through the four lifecycle entry
//! points and hands completions back through [`ProfileService::handle_completion`]
//! (or the [`drain`](ProfileService::drain) / [`pump`](ProfileService::pump)
//! helpers).  All I/O flows through the port traits, so the whole service
//! runs against the simulated peer in tests.
//!
//! ```text
//!  DevicePort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │     ProfileService      │
//!  Completion ──▶ │  sessions · lifecycle   │
//!                 └────────────────────────┘
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use log::{error, info, warn};

use crate::config::ProfileConfig;
use crate::error::{ProfileError, SessionFault};
use crate::profile::completion::{Completion, CompletionQueue};
use crate::profile::session::Session;

use super::events::ProfileEvent;
use super::ports::{DeviceId, DevicePort, EventSink};

// ───────────────────────────────────────────────────────────────
// ProfileService
// ───────────────────────────────────────────────────────────────

pub struct ProfileService<D: DevicePort> {
    config: ProfileConfig,
    sessions: HashMap<DeviceId, Session<D>>,
}

impl<D: DevicePort> ProfileService<D> {
    pub fn new(config: ProfileConfig) -> Self {
        info!(
            "HRP: profile '{}' registered, measurement flow {:?}",
            config.name, config.measurement_flow
        );
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Create a session for `device`.  A device that already has one is
    /// rejected and its session left untouched.
    pub fn bind(&mut self, device: &Rc<D>, sink: &mut impl EventSink) -> Result<(), ProfileError> {
        let id = device.id();
        info!("HRP profile probe ({})", device.address());

        if self.sessions.contains_key(&id) {
            error!("HRP ({}): profile probed twice for the same device", device.address());
            return Err(ProfileError::AlreadyProbed);
        }

        self.sessions.insert(id, Session::probe(Rc::clone(device)));
        sink.emit(&ProfileEvent::Probed(id));
        Ok(())
    }

    /// Discover and wire the Heart Rate service of a bound device.
    pub fn accept(&mut self, id: DeviceId, sink: &mut impl EventSink) -> Result<(), ProfileError> {
        let result = match self.sessions.get_mut(&id) {
            Some(session) => {
                info!("HRP profile accept ({})", session.context().address());
                session.accept(&self.config, sink)
            }
            None => {
                error!("HRP ({id}): service not handled by profile");
                Err(ProfileError::NotProbed)
            }
        };
        sink.emit(&ProfileEvent::ConnectingComplete { device: id, result });
        result
    }

    /// End the bound period.  Always succeeds, including for devices the
    /// profile does not know.
    pub fn disconnect(&mut self, id: DeviceId, sink: &mut impl EventSink) -> Result<(), ProfileError> {
        match self.sessions.get_mut(&id) {
            Some(session) => {
                info!("HRP profile disconnect ({})", session.context().address());
                session.disconnect();
            }
            None => warn!("HRP ({id}): disconnect for a device without a session"),
        }
        sink.emit(&ProfileEvent::DisconnectingComplete(id));
        Ok(())
    }

    /// Destroy the session of `id`, releasing everything it holds.
    pub fn remove(&mut self, id: DeviceId, sink: &mut impl EventSink) {
        let Some(mut session) = self.sessions.remove(&id) else {
            error!("HRP ({id}): service not handled by profile");
            return;
        };
        info!("HRP profile remove ({})", session.context().address());
        session.remove();
        drop(session);
        sink.emit(&ProfileEvent::Removed(id));
    }

    // ── Completions ───────────────────────────────────────────

    /// Hand one completion to the session that issued it.
    pub fn handle_completion(&mut self, completion: Completion, sink: &mut impl EventSink) {
        let id = completion.token().device;
        match self.sessions.get_mut(&id) {
            Some(session) => session.handle_completion(completion, sink),
            None => {
                let handle = completion.handle();
                warn!("HRP ({id}): dropping completion for 0x{handle:04x}, no session");
                sink.emit(&ProfileEvent::Fault {
                    device: id,
                    fault: SessionFault::StrayCallback { handle },
                });
            }
        }
    }

    /// Handle everything currently queued, including completions posted
    /// while draining.  Returns how many were handled.  Completions the
    /// queue refused since the last drain are reported afterwards.
    pub fn drain(&mut self, queue: &CompletionQueue, sink: &mut impl EventSink) -> usize {
        let mut handled = 0;
        while let Some(completion) = queue.try_take() {
            self.handle_completion(completion, sink);
            handled += 1;
        }
        Self::report_dropped(queue, sink);
        handled
    }

    /// Wait for the next completion and handle it.
    pub async fn pump(&mut self, queue: &CompletionQueue, sink: &mut impl EventSink) {
        let completion = queue.take().await;
        self.handle_completion(completion, sink);
        Self::report_dropped(queue, sink);
    }

    fn report_dropped(queue: &CompletionQueue, sink: &mut impl EventSink) {
        for dropped in queue.take_dropped() {
            warn!(
                "HRP ({}): {} completion(s) for 0x{:04x} lost to a full queue",
                dropped.device, dropped.count, dropped.handle
            );
            sink.emit(&ProfileEvent::Fault {
                device: dropped.device,
                fault: SessionFault::CompletionsDropped {
                    handle: dropped.handle,
                    count: dropped.count,
                },
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn session(&self, id: DeviceId) -> Option<&Session<D>> {
        self.sessions.get(&id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
