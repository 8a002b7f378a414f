// Nullmove uinput Output Layer
// Virtual keyboard creation and raw event emission

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, BusType, EventType, InputEvent, InputId, Key};

use super::{EventSink, SinkError};
use crate::event::{OutputEvent, EV_SYN};

/// Display name the sink registers; enumeration filters it back out.
pub const VIRTUAL_DEVICE_NAME: &str = "Null Movement Keyboard";

const VIRTUAL_VENDOR: u16 = 0x1234;
const VIRTUAL_PRODUCT: u16 = 0x5678;

// KEY_MAX from input-event-codes.h; the sink announces the whole range even
// though the tracker only forwards codes below MAX_KEYS.
const KEY_CODE_RANGE: u16 = 0x2ff;

/// Write-only uinput device that downstream consumers cannot distinguish
/// from a physical keyboard.
pub struct VirtualKeyboard {
    device: VirtualDevice,
}

impl VirtualKeyboard {
    /// Register capabilities and instantiate the device under the fixed
    /// virtual identity.
    pub fn create() -> Result<Self, SinkError> {
        let mut keys = AttributeSet::new();
        for code in 0..KEY_CODE_RANGE {
            keys.insert(Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(SinkError::Create)?
            .name(VIRTUAL_DEVICE_NAME)
            .input_id(InputId::new(
                BusType::BUS_USB,
                VIRTUAL_VENDOR,
                VIRTUAL_PRODUCT,
                1,
            ))
            .with_keys(&keys)
            .map_err(SinkError::Create)?
            .build()
            .map_err(SinkError::Create)?;

        Ok(Self { device })
    }

    /// Tear the device down. UI_DEV_DESTROY runs exactly once, on drop.
    pub fn close(self) {
        drop(self);
    }
}

impl EventSink for VirtualKeyboard {
    fn emit(&mut self, event: &OutputEvent) -> Result<(), SinkError> {
        let record = match *event {
            OutputEvent::Key { code, action } => {
                InputEvent::new(EventType::KEY, code.code(), action.to_i32())
            }
            OutputEvent::Other {
                event_type,
                code,
                value,
            } => InputEvent::new(EventType(event_type), code, value),
            OutputEvent::Syn => InputEvent::new(EventType(EV_SYN), 0, 0),
        };

        self.device.emit(&[record]).map_err(SinkError::Write)
    }
}
