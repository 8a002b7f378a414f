// Nullmove Key Type
// Bounded key code from Linux input-event-codes.h plus a cosmetic name table

use std::fmt;

/// Number of key codes the tracker models. Raw codes at or above this bound
/// are dropped before they can touch the state vector.
pub const MAX_KEYS: usize = 256;

/// A validated key code in `[0, MAX_KEYS)`.
///
/// Opaque beyond ordering and equality; the ordering is what drives the
/// lowest-index fallback scan when the active key is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(u16);

impl KeyCode {
    /// Validate a raw evdev code. Returns `None` for codes outside the
    /// tracked range.
    pub fn new(code: u16) -> Option<Self> {
        if (code as usize) < MAX_KEYS {
            Some(Self(code))
        } else {
            None
        }
    }

    /// The raw evdev code.
    pub fn code(self) -> u16 {
        self.0
    }

    /// Index into a `MAX_KEYS`-sized vector.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Human-readable name, for diagnostics only.
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Display name for a key code. Cosmetic only; unlisted codes map to
/// "UNKNOWN".
pub fn key_name(code: u16) -> &'static str {
    match code {
        1 => "ESC",
        14 => "BACKSPACE",
        15 => "TAB",
        16 => "Q",
        17 => "W",
        18 => "E",
        19 => "R",
        20 => "T",
        21 => "Y",
        22 => "U",
        23 => "I",
        24 => "O",
        25 => "P",
        28 => "ENTER",
        29 => "LEFT CTRL",
        30 => "A",
        31 => "S",
        32 => "D",
        33 => "F",
        34 => "G",
        35 => "H",
        36 => "J",
        37 => "K",
        38 => "L",
        42 => "LEFT SHIFT",
        44 => "Z",
        45 => "X",
        46 => "C",
        47 => "V",
        48 => "B",
        49 => "N",
        50 => "M",
        54 => "RIGHT SHIFT",
        56 => "LEFT ALT",
        57 => "SPACE",
        97 => "RIGHT CTRL",
        100 => "RIGHT ALT",
        103 => "UP",
        105 => "LEFT",
        106 => "RIGHT",
        108 => "DOWN",
        _ => "UNKNOWN",
    }
}
