// Nullmove Input Layer
// Device detection heuristics and keyboard enumeration

mod device;
mod enumerate;

pub use device::{is_keyboard, is_virtual_device, name_matches_keyboard, DeviceCapabilities};
pub use enumerate::{find_keyboards, DetectionPolicy, Keyboard};
