// Nullmove Pressed Key State
// Fixed-size bitset over the tracked key code range

use crate::key::{KeyCode, MAX_KEYS};

const WORD_BITS: usize = 64;
const WORDS: usize = MAX_KEYS / WORD_BITS;

/// Which keys are currently physically held, one bit per key code.
///
/// The representation is fixed-size so membership updates never allocate on
/// the event path, and `first_pressed` gives the lowest-index scan the
/// fallback policy requires.
#[derive(Debug, Clone, Default)]
pub struct PressedSet {
    bits: [u64; WORDS],
}

impl PressedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as held.
    pub fn insert(&mut self, key: KeyCode) {
        let idx = key.index();
        self.bits[idx / WORD_BITS] |= 1 << (idx % WORD_BITS);
    }

    /// Mark a key as released. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: KeyCode) {
        let idx = key.index();
        self.bits[idx / WORD_BITS] &= !(1 << (idx % WORD_BITS));
    }

    /// Whether a key is currently held.
    pub fn contains(&self, key: KeyCode) -> bool {
        let idx = key.index();
        self.bits[idx / WORD_BITS] & (1 << (idx % WORD_BITS)) != 0
    }

    /// True when no key is held.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    /// Number of held keys.
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Lowest-index held key, if any. This scan order is the fallback
    /// tie-break: first still-held code from 0 upward wins.
    pub fn first_pressed(&self) -> Option<KeyCode> {
        for (word_idx, word) in self.bits.iter().enumerate() {
            if *word != 0 {
                let bit = word.trailing_zeros() as usize;
                let code = (word_idx * WORD_BITS + bit) as u16;
                return KeyCode::new(code);
            }
        }
        None
    }

    /// Release every key.
    pub fn clear(&mut self) {
        self.bits = [0; WORDS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: u16) -> KeyCode {
        KeyCode::new(code).unwrap()
    }

    #[test]
    fn test_new_set_is_empty() {
        let set = PressedSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.first_pressed(), None);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = PressedSet::new();
        set.insert(key(30));
        assert!(set.contains(key(30)));
        assert!(!set.contains(key(31)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut set = PressedSet::new();
        set.insert(key(30));
        set.remove(key(30));
        assert!(!set.contains(key(30)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = PressedSet::new();
        set.insert(key(30));
        set.remove(key(57));
        assert!(set.contains(key(30)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_first_pressed_is_lowest_index() {
        let mut set = PressedSet::new();
        set.insert(key(7));
        set.insert(key(3));
        set.insert(key(200));
        assert_eq!(set.first_pressed(), Some(key(3)));

        set.remove(key(3));
        assert_eq!(set.first_pressed(), Some(key(7)));

        set.remove(key(7));
        assert_eq!(set.first_pressed(), Some(key(200)));
    }

    #[test]
    fn test_first_pressed_across_word_boundaries() {
        let mut set = PressedSet::new();
        set.insert(key(63));
        set.insert(key(64));
        set.insert(key(128));
        assert_eq!(set.first_pressed(), Some(key(63)));
        set.remove(key(63));
        assert_eq!(set.first_pressed(), Some(key(64)));
    }

    #[test]
    fn test_range_extremes() {
        let mut set = PressedSet::new();
        set.insert(key(0));
        set.insert(key(255));
        assert!(set.contains(key(0)));
        assert!(set.contains(key(255)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.first_pressed(), Some(key(0)));
    }

    #[test]
    fn test_clear() {
        let mut set = PressedSet::new();
        set.insert(key(1));
        set.insert(key(100));
        set.clear();
        assert!(set.is_empty());
    }
}
