//! Held-modifier tracking.
//!
//! The tracker remembers which raw modifier codes are currently down. It is
//! owned by the capture thread (inside the [`Dispatcher`](crate::Dispatcher)),
//! so it is plain state with no locking.

use std::collections::HashSet;

use crate::key::RawKeyCode;
use crate::logging::targets;
use crate::modifiers::ModifierSet;

/// Set of raw modifier codes that are currently held.
#[derive(Debug, Default, Clone)]
pub struct ModifierTracker {
    held: HashSet<RawKeyCode>,
}

impl ModifierTracker {
    /// Create a tracker with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down. Returns true if `code` is a modifier, in which case
    /// it is now held; non-modifier codes are ignored.
    pub fn on_modifier_down(&mut self, code: RawKeyCode) -> bool {
        if !code.is_modifier() {
            return false;
        }
        if self.held.insert(code) {
            tracing::trace!(target: targets::TRACKER, key = %code, "modifier down");
        }
        true
    }

    /// Record a key-up. Releasing a code that is not held is a no-op.
    /// Returns true if `code` is a modifier.
    pub fn on_modifier_up(&mut self, code: RawKeyCode) -> bool {
        if !code.is_modifier() {
            return false;
        }
        if self.held.remove(&code) {
            tracing::trace!(target: targets::TRACKER, key = %code, "modifier up");
        }
        true
    }

    /// The logical modifiers currently held. Left and right variants of the
    /// same modifier collapse into one member.
    pub fn current_set(&self) -> ModifierSet {
        self.held.iter().filter_map(|code| code.modifier()).collect()
    }

    /// Number of raw modifier codes held.
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Forget every held modifier.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::LogicalModifier;

    #[test]
    fn test_left_and_right_collapse() {
        let mut tracker = ModifierTracker::new();
        tracker.on_modifier_down(RawKeyCode::LeftControl);
        tracker.on_modifier_down(RawKeyCode::RightControl);

        let set = tracker.current_set();
        assert_eq!(set, ModifierSet::CTRL);
        assert_eq!(set.len(), 1);
        assert_eq!(tracker.held_count(), 2);

        // Still held through the right-hand key.
        tracker.on_modifier_up(RawKeyCode::LeftControl);
        assert!(tracker.current_set().contains(LogicalModifier::Control));

        tracker.on_modifier_up(RawKeyCode::RightControl);
        assert!(tracker.current_set().is_empty());
    }

    #[test]
    fn test_release_of_unheld_code_is_noop() {
        let mut tracker = ModifierTracker::new();
        assert!(tracker.on_modifier_up(RawKeyCode::LeftAlt));
        assert_eq!(tracker.held_count(), 0);
    }

    #[test]
    fn test_non_modifiers_are_ignored() {
        let mut tracker = ModifierTracker::new();
        assert!(!tracker.on_modifier_down(RawKeyCode::A));
        assert!(!tracker.on_modifier_up(RawKeyCode::A));
        assert!(tracker.current_set().is_empty());
    }

    #[test]
    fn test_interleaved_presses() {
        let mut tracker = ModifierTracker::new();
        tracker.on_modifier_down(RawKeyCode::LeftShift);
        tracker.on_modifier_down(RawKeyCode::RightAlt);
        tracker.on_modifier_up(RawKeyCode::LeftShift);
        tracker.on_modifier_down(RawKeyCode::LeftMeta);

        assert_eq!(
            tracker.current_set(),
            ModifierSet::ALT.with(LogicalModifier::Meta)
        );

        tracker.clear();
        assert_eq!(tracker.held_count(), 0);
    }
}
