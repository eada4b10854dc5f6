//! Function-pointer finite state machine engine for the session lifecycle.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  StateTable                                      │
//! │  ┌──────────────┬────────────┬────────────┐      │
//! │  │ SessionState │ on_enter   │ on_exit    │      │
//! │  ├──────────────┼────────────┼────────────┤      │
//! │  │ Unbound      │ —          │ —          │      │
//! │  │ Probed       │ fn(ctx)    │ —          │      │
//! │  │ Accepting    │ fn(ctx)    │ —          │      │
//! │  │ Bound        │ fn(ctx)    │ fn(ctx)    │      │
//! │  │ Disconnected │ fn(ctx)    │ —          │      │
//! │  │ Removed      │ fn(ctx)    │ —          │      │
//! │  └──────────────┴────────────┴────────────┘      │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Transitions are event-driven: the session asks the engine to move to a
//! state, the engine checks the edge against [`SessionState::can_transition`],
//! runs `on_exit` for the current state, then `on_enter` for the next.
//! Resource acquisition and release live in those actions, so every path
//! out of the bound period releases through the same code.

pub mod context;
pub mod states;

use log::{info, warn};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Lifecycle states of one device session.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionState {
    Unbound = 0,
    Probed = 1,
    Accepting = 2,
    Bound = 3,
    Disconnected = 4,
    Removed = 5,
}

impl SessionState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 6;

    /// Convert an index back to `SessionState`.  Out-of-range indices map
    /// to `Removed`, the terminal state.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Unbound,
            1 => Self::Probed,
            2 => Self::Accepting,
            3 => Self::Bound,
            4 => Self::Disconnected,
            _ => Self::Removed,
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// ```text
    ///  Unbound ──bind──▶ Probed ──accept──▶ Accepting ──found──▶ Bound
    ///                      ▲  │                 │                  │
    ///                      │  │            not found           disconnect
    ///                      └──┼─────────────────┤                  ▼
    ///                         │                 └────────▶ Disconnected
    ///                         │                     ▲   accept │
    ///                         │                     └──────────┘ (via Accepting)
    ///                         ▼
    ///  Probed | Bound | Disconnected ──remove──▶ Removed
    /// ```
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unbound, Self::Probed)
                | (Self::Probed | Self::Disconnected, Self::Accepting)
                | (
                    Self::Accepting,
                    Self::Bound | Self::Probed | Self::Disconnected
                )
                | (Self::Bound, Self::Disconnected)
                | (
                    Self::Probed | Self::Bound | Self::Disconnected,
                    Self::Removed
                )
        )
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn<C> = fn(&mut C);

/// Static descriptor for a single lifecycle state.
pub struct StateDescriptor<C> {
    pub id: SessionState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<C>>,
    pub on_exit: Option<StateActionFn<C>>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The lifecycle engine.  Owns the state table; the context is passed in
/// on every transition so the caller keeps ownership of it.
pub struct Fsm<C> {
    /// Fixed-size table indexed by `SessionState as usize`.
    table: [StateDescriptor<C>; SessionState::COUNT],
    current: usize,
    /// Number of transitions taken so far.
    transitions: u32,
}

impl<C> Fsm<C> {
    pub fn new(table: [StateDescriptor<C>; SessionState::COUNT], initial: SessionState) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    pub fn current_state(&self) -> SessionState {
        SessionState::from_index(self.current)
    }

    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    /// Move to `next`: `on_exit(current)` → update pointer → `on_enter(next)`.
    ///
    /// Returns `false` and leaves everything untouched if the edge is not
    /// part of the lifecycle.
    pub fn transition(&mut self, next: SessionState, ctx: &mut C) -> bool {
        let from = self.current_state();
        if !from.can_transition(next) {
            warn!(
                "Session FSM: rejected transition {} -> {}",
                self.table[self.current].name,
                self.table[next as usize].name
            );
            return false;
        }

        info!(
            "Session FSM: {} -> {}",
            self.table[self.current].name, self.table[next as usize].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next as usize;
        self.transitions += 1;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
        true
    }
}
