//! Typed completions and the queue that carries them.
//!
//! Every request the profile issues carries a [`RequestToken`].  The GATT
//! client adapter hands the token back inside a [`Completion`], which is
//! posted to a [`CompletionQueue`] and handled on the same thread once the
//! issuing call has returned.
//!
//! ```text
//! ┌──────────────┐ read/register ┌──────────────┐
//! │   Session    │──────────────▶│  GattClient  │
//! │              │               │  (adapter)   │
//! │              │◀──────────────│              │
//! └──────────────┘  Completion   └──────────────┘
//!         ▲            via              │
//!         └──── CompletionQueue ◀───────┘
//! ```
//!
//! The queue is an `embassy-sync` channel over `NoopRawMutex`: bounded
//! and not `Sync`.  A completion posted to a full queue is refused and
//! counted per device and handle; the service reports the count as a
//! fault the next time it drains.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::collections::BTreeMap;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::warn;

use crate::app::ports::DeviceId;
use crate::codec::AttValue;
use crate::error::AttError;

/// Depth of the completion queue.
pub const COMPLETION_QUEUE_DEPTH: usize = 32;

/// What a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Heart Rate Measurement characteristic.
    Measurement,
    /// Body Sensor Location characteristic.
    SensorLocation,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Measurement => f.write_str("Heart Rate Measurement"),
            Self::SensorLocation => f.write_str("Body Sensor Location"),
        }
    }
}

/// Session handle threaded through every asynchronous request.
///
/// `generation` is the session's bound-period counter at the time the
/// request was issued; a completion whose generation no longer matches
/// belongs to a period that has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    pub device: DeviceId,
    pub generation: u32,
    pub handle: u16,
    pub purpose: Purpose,
}

/// The result of an earlier request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A read finished.
    Read {
        token: RequestToken,
        result: Result<AttValue, AttError>,
    },
    /// The client characteristic configuration write finished.
    /// `status` is the ATT error code, 0 on success.
    NotifyRegistered { token: RequestToken, status: u8 },
    /// The peer pushed a value.
    Notification {
        token: RequestToken,
        handle: u16,
        value: AttValue,
    },
}

impl Completion {
    pub fn token(&self) -> &RequestToken {
        match self {
            Self::Read { token, .. }
            | Self::NotifyRegistered { token, .. }
            | Self::Notification { token, .. } => token,
        }
    }

    /// The attribute handle this completion reports on.
    pub fn handle(&self) -> u16 {
        match self {
            Self::Notification { handle, .. } => *handle,
            other => other.token().handle,
        }
    }
}

/// Completions refused by a full queue for one device and handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedCompletions {
    pub device: DeviceId,
    pub handle: u16,
    pub count: u32,
}

/// Bounded single-thread queue of pending completions.
pub struct CompletionQueue {
    channel: Channel<NoopRawMutex, Completion, COMPLETION_QUEUE_DEPTH>,
    /// Refused since the last [`take_dropped`](Self::take_dropped).
    dropped: RefCell<BTreeMap<(DeviceId, u16), u32>>,
    dropped_total: Cell<u64>,
}

impl CompletionQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: RefCell::new(BTreeMap::new()),
            dropped_total: Cell::new(0),
        }
    }

    /// Post a completion.  Returns `false` if the queue is full; the
    /// completion is dropped and counted.
    pub fn post(&self, completion: Completion) -> bool {
        match self.channel.try_send(completion) {
            Ok(()) => true,
            Err(TrySendError::Full(rejected)) => {
                let device = rejected.token().device;
                let handle = rejected.handle();
                warn!("HRP ({device}): completion queue full, dropping completion for 0x{handle:04x}");
                *self.dropped.borrow_mut().entry((device, handle)).or_insert(0) += 1;
                self.dropped_total.set(self.dropped_total.get() + 1);
                false
            }
        }
    }

    /// Take the oldest completion without waiting.
    pub fn try_take(&self) -> Option<Completion> {
        self.channel.try_receive().ok()
    }

    /// Wait for the next completion.
    pub async fn take(&self) -> Completion {
        self.channel.receive().await
    }

    /// Drop counts gathered since the last call, ordered by device and
    /// handle.
    pub fn take_dropped(&self) -> Vec<DroppedCompletions> {
        core::mem::take(&mut *self.dropped.borrow_mut())
            .into_iter()
            .map(|((device, handle), count)| DroppedCompletions {
                device,
                handle,
                count,
            })
            .collect()
    }

    /// Completions refused over the queue's lifetime.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total.get()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }
}

impl Default for CompletionQueue {
    fn default() -> Self {
        Self::new()
    }
}
