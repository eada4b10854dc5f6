//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                          |
//! |------------|----------------|--------------------------------------|
//! | `log_sink` | EventSink      | `log` facade                         |
//! | `sim`      | DevicePort     | In-memory peer device                |
//! |            | AttributeDb    | In-memory attribute table            |
//! |            | GattClient     | Scripted responses, CompletionQueue  |
//! |            | EventSink      | Recorded event list                  |

pub mod log_sink;
pub mod sim;
