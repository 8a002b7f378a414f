// Nullmove Input Layer - Device Detection
// Capability and name heuristics for picking keyboards out of /dev/input

/// Device capabilities extracted from evdev's capability queries.
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    /// Whether the device supports EV_KEY events
    pub has_ev_key: bool,
    /// Supported key codes (EV_KEY capability codes)
    pub supported_keys: Vec<u16>,
}

impl DeviceCapabilities {
    pub fn new(has_ev_key: bool, supported_keys: Vec<u16>) -> Self {
        Self {
            has_ev_key,
            supported_keys,
        }
    }

    /// Check if a specific key code is supported
    pub fn supports_key(&self, key_code: u16) -> bool {
        self.supported_keys.contains(&key_code)
    }
}

// Representative codes for keyboard detection: KEY_A, KEY_Z
const KEY_A: u16 = 30;
const KEY_Z: u16 = 44;

/// Determine if a device is a keyboard based on its capabilities.
///
/// A device qualifies when it reports EV_KEY support and both representative
/// letter codes (A and Z); mice and media remotes report EV_KEY but miss the
/// letter range.
pub fn is_keyboard(capabilities: &DeviceCapabilities) -> bool {
    capabilities.has_ev_key
        && capabilities.supports_key(KEY_A)
        && capabilities.supports_key(KEY_Z)
}

/// The looser name-based policy: the device name contains "keyboard",
/// case-insensitive.
pub fn name_matches_keyboard(name: &str) -> bool {
    name.to_lowercase().contains("keyboard")
}

/// Check if a device is our own virtual sink, by name.
///
/// The sink announces the full key range and would pass the capability
/// check; grabbing it would feed our own output back into the tracker.
pub fn is_virtual_device(name: &str, virtual_name: &str) -> bool {
    name.contains(virtual_name)
}
