//! Platform-level key codes.
//!
//! [`RawKeyCode`] identifies a physical key the way a low-level keyboard hook
//! reports it: modifiers come in distinct left and right variants and no
//! keyboard layout is applied. Every code has one canonical lower-case name,
//! which is what appears in the textual form of a [`KeyCombination`].
//!
//! Which codes count as modifiers is decided by [`MODIFIER_TABLE`] alone.
//!
//! [`KeyCombination`]: crate::KeyCombination

use std::fmt;

use crate::modifiers::LogicalModifier;

macro_rules! raw_key_codes {
    ($($(#[$meta:meta])* $variant:ident => $name:literal,)*) => {
        /// A physical key as reported by a raw keyboard event source.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[non_exhaustive]
        pub enum RawKeyCode {
            $($(#[$meta])* $variant,)*
        }

        impl RawKeyCode {
            /// Every known key code, in declaration order.
            pub const ALL: &[RawKeyCode] = &[$(RawKeyCode::$variant,)*];

            /// The canonical lower-case name of this key.
            pub fn name(self) -> &'static str {
                match self {
                    $(RawKeyCode::$variant => $name,)*
                }
            }

            /// Looks a key up by its canonical name. Exact match only; see
            /// [`RawKeyCode::lookup`] for case-insensitive parsing with aliases.
            pub fn from_name(name: &str) -> Option<RawKeyCode> {
                match name {
                    $($name => Some(RawKeyCode::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

raw_key_codes! {
    Escape => "escape",
    F1 => "f1",
    F2 => "f2",
    F3 => "f3",
    F4 => "f4",
    F5 => "f5",
    F6 => "f6",
    F7 => "f7",
    F8 => "f8",
    F9 => "f9",
    F10 => "f10",
    F11 => "f11",
    F12 => "f12",
    F13 => "f13",
    F14 => "f14",
    F15 => "f15",
    F16 => "f16",
    F17 => "f17",
    F18 => "f18",
    F19 => "f19",
    F20 => "f20",
    F21 => "f21",
    F22 => "f22",
    F23 => "f23",
    F24 => "f24",

    BackQuote => "backquote",
    Digit1 => "1",
    Digit2 => "2",
    Digit3 => "3",
    Digit4 => "4",
    Digit5 => "5",
    Digit6 => "6",
    Digit7 => "7",
    Digit8 => "8",
    Digit9 => "9",
    Digit0 => "0",
    Minus => "minus",
    Equals => "equals",
    Backspace => "backspace",

    Tab => "tab",
    CapsLock => "capslock",
    A => "a",
    B => "b",
    C => "c",
    D => "d",
    E => "e",
    F => "f",
    G => "g",
    H => "h",
    I => "i",
    J => "j",
    K => "k",
    L => "l",
    M => "m",
    N => "n",
    O => "o",
    P => "p",
    Q => "q",
    R => "r",
    S => "s",
    T => "t",
    U => "u",
    V => "v",
    W => "w",
    X => "x",
    Y => "y",
    Z => "z",

    OpenBracket => "openbracket",
    CloseBracket => "closebracket",
    BackSlash => "backslash",
    Semicolon => "semicolon",
    Quote => "quote",
    Enter => "enter",
    Comma => "comma",
    Period => "period",
    Slash => "slash",
    Space => "space",

    PrintScreen => "printscreen",
    ScrollLock => "scrolllock",
    Pause => "pause",
    Insert => "insert",
    Delete => "delete",
    Home => "home",
    End => "end",
    PageUp => "pageup",
    PageDown => "pagedown",
    Up => "up",
    Down => "down",
    Left => "left",
    Right => "right",
    ContextMenu => "contextmenu",

    NumLock => "numlock",
    NumPadDivide => "numpaddivide",
    NumPadMultiply => "numpadmultiply",
    NumPadSubtract => "numpadsubtract",
    NumPadAdd => "numpadadd",
    NumPadEnter => "numpadenter",
    NumPadDecimal => "numpaddecimal",
    NumPad0 => "numpad0",
    NumPad1 => "numpad1",
    NumPad2 => "numpad2",
    NumPad3 => "numpad3",
    NumPad4 => "numpad4",
    NumPad5 => "numpad5",
    NumPad6 => "numpad6",
    NumPad7 => "numpad7",
    NumPad8 => "numpad8",
    NumPad9 => "numpad9",

    LeftShift => "leftshift",
    RightShift => "rightshift",
    LeftControl => "leftcontrol",
    RightControl => "rightcontrol",
    LeftAlt => "leftalt",
    RightAlt => "rightalt",
    LeftMeta => "leftmeta",
    RightMeta => "rightmeta",
}

/// Raw codes that act as modifiers, and the logical modifier each maps to.
///
/// Codes absent from this table are never treated as modifiers.
pub const MODIFIER_TABLE: [(RawKeyCode, LogicalModifier); 8] = [
    (RawKeyCode::LeftControl, LogicalModifier::Control),
    (RawKeyCode::RightControl, LogicalModifier::Control),
    (RawKeyCode::LeftAlt, LogicalModifier::Alt),
    (RawKeyCode::RightAlt, LogicalModifier::Alt),
    (RawKeyCode::LeftShift, LogicalModifier::Shift),
    (RawKeyCode::RightShift, LogicalModifier::Shift),
    (RawKeyCode::LeftMeta, LogicalModifier::Meta),
    (RawKeyCode::RightMeta, LogicalModifier::Meta),
];

/// Extra spellings accepted when parsing key names. Never produced when
/// formatting.
const KEY_ALIASES: &[(&str, RawKeyCode)] = &[
    ("esc", RawKeyCode::Escape),
    ("return", RawKeyCode::Enter),
    ("del", RawKeyCode::Delete),
    ("ins", RawKeyCode::Insert),
    ("back", RawKeyCode::Backspace),
    ("pgup", RawKeyCode::PageUp),
    ("pgdn", RawKeyCode::PageDown),
    ("pagedn", RawKeyCode::PageDown),
    ("arrowup", RawKeyCode::Up),
    ("arrowdown", RawKeyCode::Down),
    ("arrowleft", RawKeyCode::Left),
    ("arrowright", RawKeyCode::Right),
    ("spacebar", RawKeyCode::Space),
    ("grave", RawKeyCode::BackQuote),
    ("`", RawKeyCode::BackQuote),
    ("-", RawKeyCode::Minus),
    ("=", RawKeyCode::Equals),
    ("[", RawKeyCode::OpenBracket),
    ("]", RawKeyCode::CloseBracket),
    ("\\", RawKeyCode::BackSlash),
    (";", RawKeyCode::Semicolon),
    ("'", RawKeyCode::Quote),
    (",", RawKeyCode::Comma),
    (".", RawKeyCode::Period),
    ("/", RawKeyCode::Slash),
    ("menu", RawKeyCode::ContextMenu),
];

impl RawKeyCode {
    /// The logical modifier this code stands for, if it is a modifier key.
    pub fn modifier(self) -> Option<LogicalModifier> {
        MODIFIER_TABLE
            .iter()
            .find(|(code, _)| *code == self)
            .map(|(_, modifier)| *modifier)
    }

    /// Returns true if this code appears in [`MODIFIER_TABLE`].
    pub fn is_modifier(self) -> bool {
        self.modifier().is_some()
    }

    /// Case-insensitive lookup by canonical name or alias.
    pub fn lookup(token: &str) -> Option<RawKeyCode> {
        let token = token.trim().to_ascii_lowercase();
        Self::from_name(&token).or_else(|| {
            KEY_ALIASES
                .iter()
                .find(|(alias, _)| *alias == token)
                .map(|(_, code)| *code)
        })
    }
}

impl fmt::Display for RawKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_lowercase() {
        let mut seen = HashSet::new();
        for code in RawKeyCode::ALL {
            let name = code.name();
            assert_eq!(name, name.to_ascii_lowercase());
            assert!(!name.contains('+') && !name.contains(';'), "{name}");
            assert!(seen.insert(name), "duplicate key name {name}");
            assert_eq!(RawKeyCode::from_name(name), Some(*code));
        }
    }

    #[test]
    fn test_aliases_do_not_shadow_names() {
        for (alias, _) in KEY_ALIASES {
            assert_eq!(RawKeyCode::from_name(alias), None, "{alias}");
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(RawKeyCode::lookup("F5"), Some(RawKeyCode::F5));
        assert_eq!(RawKeyCode::lookup("Delete"), Some(RawKeyCode::Delete));
        assert_eq!(RawKeyCode::lookup("PgDn"), Some(RawKeyCode::PageDown));
        assert_eq!(RawKeyCode::lookup("Return"), Some(RawKeyCode::Enter));
        assert_eq!(RawKeyCode::lookup("nope"), None);
    }

    #[test]
    fn test_modifier_table_covers_both_sides() {
        for modifier in LogicalModifier::ALL {
            let codes: Vec<_> = MODIFIER_TABLE
                .iter()
                .filter(|(_, m)| *m == modifier)
                .collect();
            assert_eq!(codes.len(), 2, "{modifier}");
        }
        assert_eq!(RawKeyCode::RightAlt.modifier(), Some(LogicalModifier::Alt));
        assert_eq!(RawKeyCode::A.modifier(), None);
        assert!(!RawKeyCode::CapsLock.is_modifier());
    }
}
