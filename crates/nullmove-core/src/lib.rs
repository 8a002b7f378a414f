// Nullmove Core Library
// Single-active-key suppression engine for Linux evdev keyboards

pub mod action;
pub mod daemon;
pub mod event;
pub mod input;
pub mod key;
pub mod logging;
pub mod output;
pub mod shutdown;
pub mod state;

pub use action::Action;
pub use daemon::{daemonize, DaemonError};
pub use event::{
    ActivityHook, DispatchError, DispatchLoop, NoopHook, OutputEvent, RawEvent, EV_KEY, EV_SYN,
};
pub use input::{
    find_keyboards, is_keyboard, is_virtual_device, name_matches_keyboard, DetectionPolicy,
    DeviceCapabilities, Keyboard,
};
pub use key::{key_name, KeyCode, MAX_KEYS};
pub use logging::{init as init_logging, LogSwitch};
pub use output::{EventSink, SinkError, VirtualKeyboard, VIRTUAL_DEVICE_NAME};
pub use shutdown::ShutdownToken;
pub use state::{NullTracker, PressedSet};
