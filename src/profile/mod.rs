//! Heart Rate profile core: per-device sessions, characteristic dispatch and
//! the read/subscribe flows.
//!
//! ```text
//!   accept ──▶ Session ──foreach characteristic──▶ dispatch
//!                 ▲                                   │
//!                 │                                   ▼
//!   Completion ───┴────────────────────────────▶ subscription ──▶ codec
//! ```

pub mod completion;
pub mod dispatch;
pub mod session;
pub mod subscription;
