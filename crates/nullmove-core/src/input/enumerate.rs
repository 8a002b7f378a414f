// Nullmove Input Layer - Enumeration
// Scans /dev/input and opens the keyboards the filter accepts

use std::path::PathBuf;

use evdev::{Device, EventType};

use super::device::{is_keyboard, is_virtual_device, name_matches_keyboard, DeviceCapabilities};
use crate::output::VIRTUAL_DEVICE_NAME;

/// Which heuristic decides that a device is a keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionPolicy {
    /// EV_KEY support plus representative letter codes (A, Z).
    Capabilities,
    /// Device name contains "keyboard", case-insensitive.
    NameMatch,
}

/// One enumerated physical keyboard: the open device handle plus its
/// identity for diagnostics. Owned by the caller from here on; the handle is
/// closed on drop at shutdown.
pub struct Keyboard {
    pub device: Device,
    pub name: String,
    pub path: PathBuf,
}

/// Extract the capability view of a device for the pure detection predicate.
fn capabilities_of(device: &Device) -> DeviceCapabilities {
    let has_ev_key = device.supported_events().contains(EventType::KEY);
    let supported_keys = device
        .supported_keys()
        .map(|keys| keys.iter().map(|k| k.code()).collect())
        .unwrap_or_default();
    DeviceCapabilities::new(has_ev_key, supported_keys)
}

/// Scan the input device directory and open up to `limit` keyboards.
///
/// Candidates are sorted by device path so indices are stable across runs
/// (callers must still not rely on any particular order). Our own virtual
/// sink is skipped to avoid a feedback loop. An unreadable directory yields
/// an empty list; the caller decides whether zero keyboards is fatal.
pub fn find_keyboards(policy: DetectionPolicy, limit: usize) -> Vec<Keyboard> {
    let mut candidates: Vec<(PathBuf, Device)> = evdev::enumerate().collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let mut keyboards = Vec::new();
    for (path, device) in candidates {
        if keyboards.len() >= limit {
            break;
        }

        let name = device.name().unwrap_or("Unknown").to_string();
        if is_virtual_device(&name, VIRTUAL_DEVICE_NAME) {
            continue;
        }

        let accepted = match policy {
            DetectionPolicy::Capabilities => is_keyboard(&capabilities_of(&device)),
            DetectionPolicy::NameMatch => name_matches_keyboard(&name),
        };

        if accepted {
            log::info!("found keyboard: {} ({})", name, path.display());
            keyboards.push(Keyboard { device, name, path });
        }
    }

    keyboards
}
