// Nullmove Event Layer
// Raw/corrected event types and the poll-multiplexed dispatch loop

mod dispatch;

pub use dispatch::{ActivityHook, DispatchError, DispatchLoop, NoopHook};

use crate::action::Action;
use crate::key::KeyCode;

/// EV_SYN event type from input-event-codes.h
pub const EV_SYN: u16 = 0x00;
/// EV_KEY event type from input-event-codes.h
pub const EV_KEY: u16 = 0x01;

/// One raw record read from a physical device, as the tracker consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    /// An EV_KEY record with a recognized value.
    Key { code: u16, action: Action },
    /// Any other event type; forwarded without state mutation.
    Other {
        event_type: u16,
        code: u16,
        value: i32,
    },
}

/// One record destined for the virtual sink.
///
/// Key events carry a validated code; `Syn` is the synchronization marker
/// that frames every forwarded or synthesized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Key { code: KeyCode, action: Action },
    Other {
        event_type: u16,
        code: u16,
        value: i32,
    },
    Syn,
}
