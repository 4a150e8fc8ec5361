//! Key combinations and their textual form.
//!
//! A [`KeyCombination`] is a set of logical modifiers plus exactly one
//! non-modifier key. Its canonical text lists modifiers in a fixed order
//! followed by the key name, all lower-case and joined by `+`:
//!
//! ```
//! use keyhook_core::{KeyCombination, ModifierSet, RawKeyCode};
//!
//! let combo = KeyCombination::normalize(ModifierSet::CTRL, RawKeyCode::C);
//! assert_eq!(combo.to_string(), "ctrl+c");
//!
//! let parsed = KeyCombination::parse("Shift + Ctrl + C").unwrap();
//! assert_eq!(parsed.unwrap().to_string(), "ctrl+shift+c");
//! ```

use std::fmt;

use crate::error::ParseError;
use crate::key::RawKeyCode;
use crate::modifiers::{LogicalModifier, ModifierSet};

/// Separator between the tokens of a combination.
pub const TOKEN_SEPARATOR: char = '+';

/// A modifier set plus one non-modifier key.
///
/// The key is never a code listed in [`MODIFIER_TABLE`](crate::key::MODIFIER_TABLE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCombination {
    modifiers: ModifierSet,
    key: RawKeyCode,
}

impl KeyCombination {
    /// Build a combination from a modifier snapshot and a key.
    ///
    /// The caller must already have filtered out modifier keys.
    pub fn normalize(modifiers: ModifierSet, key: RawKeyCode) -> Self {
        debug_assert!(!key.is_modifier(), "{key} is a modifier key");
        Self { modifiers, key }
    }

    /// Like [`normalize`](Self::normalize), but returns `None` for modifier keys.
    pub fn try_new(modifiers: ModifierSet, key: RawKeyCode) -> Option<Self> {
        (!key.is_modifier()).then_some(Self { modifiers, key })
    }

    pub(crate) const fn from_parts(modifiers: ModifierSet, key: RawKeyCode) -> Self {
        Self { modifiers, key }
    }

    /// The held modifiers.
    pub fn modifiers(&self) -> ModifierSet {
        self.modifiers
    }

    /// The non-modifier key.
    pub fn key(&self) -> RawKeyCode {
        self.key
    }

    /// Parse the textual form of a combination.
    ///
    /// Tokens are separated by `+`, trimmed and compared case-insensitively.
    /// Modifier tokens accept `ctrl`/`control`, `alt`, `shift` and
    /// `meta`/`cmd`/`command`. If several key tokens are present the last
    /// one wins. Empty or whitespace-only text means "no binding" and yields
    /// `Ok(None)`.
    pub fn parse(text: &str) -> Result<Option<Self>, ParseError> {
        let mut modifiers = ModifierSet::NONE;
        let mut key = None;
        let mut saw_token = false;

        for token in text
            .split(TOKEN_SEPARATOR)
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            saw_token = true;
            let token = token.to_ascii_lowercase();

            if let Some(modifier) = LogicalModifier::from_token(&token) {
                modifiers.insert(modifier);
                continue;
            }

            let code =
                RawKeyCode::lookup(&token).ok_or_else(|| ParseError::UnknownKey(token.clone()))?;
            if code.is_modifier() {
                return Err(ParseError::ModifierAsKey(token));
            }
            key = Some(code);
        }

        if !saw_token {
            return Ok(None);
        }
        match key {
            Some(key) => Ok(Some(Self { modifiers, key })),
            None => Err(ParseError::MissingKey),
        }
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in self.modifiers.iter() {
            write!(f, "{}{}", modifier.name(), TOKEN_SEPARATOR)?;
        }
        f.write_str(self.key.name())
    }
}
