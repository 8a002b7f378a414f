// Nullmove State Layer
// Pressed-key bitset and the single-active-key tracker

mod pressed;
mod tracker;

pub use pressed::PressedSet;
pub use tracker::NullTracker;
