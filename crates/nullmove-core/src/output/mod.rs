// Nullmove Output Layer
// Sink trait and the uinput virtual keyboard

mod uinput;

pub use uinput::{VirtualKeyboard, VIRTUAL_DEVICE_NAME};

use crate::event::OutputEvent;

/// Errors from the virtual sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to create virtual device: {0}")]
    Create(#[source] std::io::Error),

    #[error("failed to write event: {0}")]
    Write(#[source] std::io::Error),
}

/// Where corrected events go.
///
/// The dispatch loop only sees this trait, so the pipeline can be exercised
/// in tests with an in-memory sink instead of uinput.
pub trait EventSink {
    /// Write one event record. Failures are reported to the caller, which
    /// treats them as transient (logged, never retried).
    fn emit(&mut self, event: &OutputEvent) -> Result<(), SinkError>;
}
