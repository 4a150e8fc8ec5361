//! Logical modifiers and modifier sets.
//!
//! A [`LogicalModifier`] is the side-independent meaning of a modifier key:
//! `LeftControl` and `RightControl` both mean [`LogicalModifier::Control`].
//! A [`ModifierSet`] holds each logical modifier at most once, so pressing
//! both physical variants never produces a duplicate.

use std::fmt;

/// A side-independent keyboard modifier.
///
/// The declaration order is the canonical order used when formatting
/// combinations: control, alt, shift, meta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalModifier {
    /// Control (Ctrl).
    Control,
    /// Alt (Option on macOS).
    Alt,
    /// Shift.
    Shift,
    /// Meta (Windows/Super key, Command on macOS).
    Meta,
}

impl LogicalModifier {
    /// All modifiers in canonical order.
    pub const ALL: [LogicalModifier; 4] = [Self::Control, Self::Alt, Self::Shift, Self::Meta];

    /// The canonical lower-case token for this modifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::Control => "ctrl",
            Self::Alt => "alt",
            Self::Shift => "shift",
            Self::Meta => "meta",
        }
    }

    /// Recognizes a modifier token, including its synonyms.
    ///
    /// The token is expected to be lower-case already.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ctrl" | "control" => Some(Self::Control),
            "alt" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            "meta" | "cmd" | "command" => Some(Self::Meta),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of logical modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModifierSet {
    /// Control key is held.
    pub control: bool,
    /// Alt key is held.
    pub alt: bool,
    /// Shift key is held.
    pub shift: bool,
    /// Meta key is held.
    pub meta: bool,
}

impl ModifierSet {
    /// No modifiers.
    pub const NONE: Self = Self {
        control: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Control only.
    pub const CTRL: Self = Self {
        control: true,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Alt only.
    pub const ALT: Self = Self {
        control: false,
        alt: true,
        shift: false,
        meta: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self {
        control: false,
        alt: false,
        shift: true,
        meta: false,
    };

    /// Meta only.
    pub const META: Self = Self {
        control: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Adds a modifier. Adding one that is already present has no effect.
    pub fn insert(&mut self, modifier: LogicalModifier) {
        *self.slot_mut(modifier) = true;
    }

    /// Returns a copy of this set with `modifier` added.
    pub const fn with(mut self, modifier: LogicalModifier) -> Self {
        match modifier {
            LogicalModifier::Control => self.control = true,
            LogicalModifier::Alt => self.alt = true,
            LogicalModifier::Shift => self.shift = true,
            LogicalModifier::Meta => self.meta = true,
        }
        self
    }

    /// Returns true if `modifier` is in the set.
    pub fn contains(&self, modifier: LogicalModifier) -> bool {
        match modifier {
            LogicalModifier::Control => self.control,
            LogicalModifier::Alt => self.alt,
            LogicalModifier::Shift => self.shift,
            LogicalModifier::Meta => self.meta,
        }
    }

    /// Number of modifiers in the set.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if no modifier is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Iterates the members in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = LogicalModifier> + '_ {
        LogicalModifier::ALL
            .into_iter()
            .filter(move |modifier| self.contains(*modifier))
    }

    fn slot_mut(&mut self, modifier: LogicalModifier) -> &mut bool {
        match modifier {
            LogicalModifier::Control => &mut self.control,
            LogicalModifier::Alt => &mut self.alt,
            LogicalModifier::Shift => &mut self.shift,
            LogicalModifier::Meta => &mut self.meta,
        }
    }
}

impl FromIterator<LogicalModifier> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = LogicalModifier>>(iter: I) -> Self {
        let mut set = Self::NONE;
        for modifier in iter {
            set.insert(modifier);
        }
        set
    }
}

impl Extend<LogicalModifier> for ModifierSet {
    fn extend<I: IntoIterator<Item = LogicalModifier>>(&mut self, iter: I) {
        for modifier in iter {
            self.insert(modifier);
        }
    }
}
