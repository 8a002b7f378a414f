// Nullmove Tracker
// The suppression core: last-pressed-wins with lowest-index fallback

use smallvec::SmallVec;

use crate::action::Action;
use crate::event::{OutputEvent, RawEvent, EV_SYN};
use crate::key::KeyCode;
use crate::state::PressedSet;

/// Output burst for one input event. Never exceeds four records: at most one
/// synthetic key + sync pair ahead of the forwarded event + sync.
pub type OutputBurst = SmallVec<[OutputEvent; 4]>;

/// Tracks the physical pressed set and the single key reported as active.
///
/// Invariant, restored after every `process` call: `active` is either `None`
/// or a member of `pressed`, and the emitted stream never contains two press
/// events without an intervening release for one of them.
#[derive(Debug, Default)]
pub struct NullTracker {
    pressed: PressedSet,
    active: Option<KeyCode>,
}

impl NullTracker {
    /// Create a tracker with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// The key currently reported as pressed downstream, if any.
    pub fn active_key(&self) -> Option<KeyCode> {
        self.active
    }

    /// Whether a key is physically held per the last raw event seen for it.
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(key)
    }

    /// Number of physically held keys.
    pub fn pressed_count(&self) -> usize {
        self.pressed.len()
    }

    /// Consume one raw event and produce the corrected output burst.
    ///
    /// Key events with out-of-range codes are dropped. Non-key events pass
    /// through untouched, except raw EV_SYN records which are consumed
    /// because every forwarded event already gets its own sync marker.
    pub fn process(&mut self, event: RawEvent) -> OutputBurst {
        let mut out = OutputBurst::new();
        match event {
            RawEvent::Key { code, action } => {
                let Some(key) = KeyCode::new(code) else {
                    log::debug!("dropping key event with out-of-range code {}", code);
                    return out;
                };
                match action {
                    Action::Press | Action::Repeat => self.on_press(key, action, &mut out),
                    Action::Release => self.on_release(key, &mut out),
                }
            }
            RawEvent::Other {
                event_type,
                code,
                value,
            } => {
                if event_type != EV_SYN {
                    out.push(OutputEvent::Other {
                        event_type,
                        code,
                        value,
                    });
                    out.push(OutputEvent::Syn);
                }
            }
        }
        out
    }

    fn on_press(&mut self, key: KeyCode, action: Action, out: &mut OutputBurst) {
        self.pressed.insert(key);

        // A different key was active: release it downstream before the new
        // press becomes visible, so only one key ever reads as held.
        if let Some(previous) = self.active {
            if previous != key {
                out.push(OutputEvent::Key {
                    code: previous,
                    action: Action::Release,
                });
                out.push(OutputEvent::Syn);
            }
        }
        self.active = Some(key);

        out.push(OutputEvent::Key { code: key, action });
        out.push(OutputEvent::Syn);
    }

    fn on_release(&mut self, key: KeyCode, out: &mut OutputBurst) {
        self.pressed.remove(key);

        if self.active == Some(key) {
            self.active = None;
            // Fall back to the lowest-index still-held key, announcing its
            // press before the original release goes out.
            if let Some(next) = self.pressed.first_pressed() {
                self.active = Some(next);
                out.push(OutputEvent::Key {
                    code: next,
                    action: Action::Press,
                });
                out.push(OutputEvent::Syn);
            }
        }

        out.push(OutputEvent::Key {
            code: key,
            action: Action::Release,
        });
        out.push(OutputEvent::Syn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: u16) -> KeyCode {
        KeyCode::new(code).unwrap()
    }

    fn press(code: u16) -> RawEvent {
        RawEvent::Key {
            code,
            action: Action::Press,
        }
    }

    fn release(code: u16) -> RawEvent {
        RawEvent::Key {
            code,
            action: Action::Release,
        }
    }

    #[test]
    fn test_single_press_forwarded() {
        let mut tracker = NullTracker::new();
        let out = tracker.process(press(30));
        assert_eq!(
            out.as_slice(),
            &[
                OutputEvent::Key {
                    code: key(30),
                    action: Action::Press
                },
                OutputEvent::Syn,
            ]
        );
        assert_eq!(tracker.active_key(), Some(key(30)));
        assert!(tracker.is_pressed(key(30)));
    }

    #[test]
    fn test_second_press_releases_previous_active() {
        let mut tracker = NullTracker::new();
        tracker.process(press(30));
        let out = tracker.process(press(31));
        assert_eq!(
            out.as_slice(),
            &[
                OutputEvent::Key {
                    code: key(30),
                    action: Action::Release
                },
                OutputEvent::Syn,
                OutputEvent::Key {
                    code: key(31),
                    action: Action::Press
                },
                OutputEvent::Syn,
            ]
        );
        assert_eq!(tracker.active_key(), Some(key(31)));
        // Both remain physically held.
        assert!(tracker.is_pressed(key(30)));
        assert!(tracker.is_pressed(key(31)));
    }

    #[test]
    fn test_release_of_inactive_key_only_forwards() {
        let mut tracker = NullTracker::new();
        tracker.process(press(30));
        tracker.process(press(31));
        let out = tracker.process(release(30));
        assert_eq!(
            out.as_slice(),
            &[
                OutputEvent::Key {
                    code: key(30),
                    action: Action::Release
                },
                OutputEvent::Syn,
            ]
        );
        assert_eq!(tracker.active_key(), Some(key(31)));
    }

    #[test]
    fn test_release_of_active_key_falls_back_to_lowest() {
        let mut tracker = NullTracker::new();
        tracker.process(press(3));
        tracker.process(press(7));
        tracker.process(press(2));
        // 2 was pressed last, so it is active; releasing it falls back to
        // the lowest of the still-held {3, 7}.
        let out = tracker.process(release(2));
        assert_eq!(
            out.as_slice(),
            &[
                OutputEvent::Key {
                    code: key(3),
                    action: Action::Press
                },
                OutputEvent::Syn,
                OutputEvent::Key {
                    code: key(2),
                    action: Action::Release
                },
                OutputEvent::Syn,
            ]
        );
        assert_eq!(tracker.active_key(), Some(key(3)));
    }

    #[test]
    fn test_release_last_key_clears_active() {
        let mut tracker = NullTracker::new();
        tracker.process(press(30));
        let out = tracker.process(release(30));
        assert_eq!(
            out.as_slice(),
            &[
                OutputEvent::Key {
                    code: key(30),
                    action: Action::Release
                },
                OutputEvent::Syn,
            ]
        );
        assert_eq!(tracker.active_key(), None);
        assert_eq!(tracker.pressed_count(), 0);
    }

    #[test]
    fn test_release_of_unpressed_key_is_forwarding_noop() {
        let mut tracker = NullTracker::new();
        tracker.process(press(30));
        let out = tracker.process(release(57));
        assert_eq!(
            out.as_slice(),
            &[
                OutputEvent::Key {
                    code: key(57),
                    action: Action::Release
                },
                OutputEvent::Syn,
            ]
        );
        assert_eq!(tracker.active_key(), Some(key(30)));
    }

    #[test]
    fn test_repeat_marks_pressed_and_keeps_active() {
        let mut tracker = NullTracker::new();
        tracker.process(press(30));
        let out = tracker.process(RawEvent::Key {
            code: 30,
            action: Action::Repeat,
        });
        // Repeat of the active key forwards with no synthetic pair.
        assert_eq!(
            out.as_slice(),
            &[
                OutputEvent::Key {
                    code: key(30),
                    action: Action::Repeat
                },
                OutputEvent::Syn,
            ]
        );
        assert_eq!(tracker.active_key(), Some(key(30)));
    }

    #[test]
    fn test_repeat_of_other_key_switches_active() {
        let mut tracker = NullTracker::new();
        tracker.process(press(30));
        let out = tracker.process(RawEvent::Key {
            code: 31,
            action: Action::Repeat,
        });
        assert_eq!(out.len(), 4);
        assert_eq!(
            out[0],
            OutputEvent::Key {
                code: key(30),
                action: Action::Release
            }
        );
        assert_eq!(tracker.active_key(), Some(key(31)));
    }

    #[test]
    fn test_out_of_range_code_dropped() {
        let mut tracker = NullTracker::new();
        let out = tracker.process(press(300));
        assert!(out.is_empty());
        assert_eq!(tracker.active_key(), None);
        assert_eq!(tracker.pressed_count(), 0);
    }

    #[test]
    fn test_non_key_event_passthrough() {
        let mut tracker = NullTracker::new();
        let out = tracker.process(RawEvent::Other {
            event_type: 0x11, // EV_LED
            code: 0,
            value: 1,
        });
        assert_eq!(
            out.as_slice(),
            &[
                OutputEvent::Other {
                    event_type: 0x11,
                    code: 0,
                    value: 1
                },
                OutputEvent::Syn,
            ]
        );
        assert_eq!(tracker.active_key(), None);
    }

    #[test]
    fn test_raw_syn_is_consumed() {
        let mut tracker = NullTracker::new();
        let out = tracker.process(RawEvent::Other {
            event_type: EV_SYN,
            code: 0,
            value: 0,
        });
        assert!(out.is_empty());
    }

    #[test]
    fn test_active_always_member_of_pressed() {
        let mut tracker = NullTracker::new();
        let sequence = [
            press(20),
            press(21),
            release(20),
            press(22),
            release(22),
            release(21),
            release(21),
        ];
        for event in sequence {
            tracker.process(event);
            if let Some(active) = tracker.active_key() {
                assert!(tracker.is_pressed(active));
            } else {
                assert_eq!(tracker.pressed_count(), 0);
            }
        }
    }
}
