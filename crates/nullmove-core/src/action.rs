// Nullmove Action Type
// Raw evdev key event values: 0 = release, 1 = press, 2 = autorepeat

use std::fmt;

/// The action carried by one raw key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl Action {
    /// Returns true for PRESS and REPEAT (the key is physically down).
    pub fn is_pressed(self) -> bool {
        matches!(self, Action::Press | Action::Repeat)
    }

    /// Returns true only for the initial PRESS event.
    pub fn just_pressed(self) -> bool {
        matches!(self, Action::Press)
    }

    /// Returns true for a RELEASE event.
    pub fn is_released(self) -> bool {
        matches!(self, Action::Release)
    }

    /// Create an Action from a raw evdev value.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Action::Release),
            1 => Some(Action::Press),
            2 => Some(Action::Repeat),
            _ => None,
        }
    }

    /// Convert to the raw evdev value.
    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Release => write!(f, "release"),
            Action::Press => write!(f, "press"),
            Action::Repeat => write!(f, "repeat"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_properties() {
        assert!(Action::Press.is_pressed());
        assert!(Action::Press.just_pressed());
        assert!(!Action::Press.is_released());

        assert!(Action::Repeat.is_pressed());
        assert!(!Action::Repeat.just_pressed());

        assert!(!Action::Release.is_pressed());
        assert!(Action::Release.is_released());
    }

    #[test]
    fn test_action_from_i32() {
        assert_eq!(Action::from_i32(0), Some(Action::Release));
        assert_eq!(Action::from_i32(1), Some(Action::Press));
        assert_eq!(Action::from_i32(2), Some(Action::Repeat));
        assert_eq!(Action::from_i32(3), None);
        assert_eq!(Action::from_i32(-1), None);
    }

    #[test]
    fn test_action_to_i32() {
        assert_eq!(Action::Release.to_i32(), 0);
        assert_eq!(Action::Press.to_i32(), 1);
        assert_eq!(Action::Repeat.to_i32(), 2);
    }
}
