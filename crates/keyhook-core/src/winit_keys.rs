//! Conversion from winit keyboard events.
//!
//! A windowed application can drive keyhook from its own event loop instead
//! of an OS-wide hook: forward each `WindowEvent::KeyboardInput` through
//! [`RawEventSender::send_winit`] into a [`ChannelSource`].
//!
//! Only physical key codes are used, so results do not depend on the active
//! keyboard layout.
//!
//! [`ChannelSource`]: crate::ChannelSource

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::key::RawKeyCode;
use crate::source::{RawEventSender, RawKeyEvent};

/// Converts a winit physical key. Returns `None` for keys keyhook has no code for.
pub fn raw_key_from_winit(physical: &PhysicalKey) -> Option<RawKeyCode> {
    match physical {
        PhysicalKey::Code(code) => raw_key_from_winit_code(code),
        PhysicalKey::Unidentified(_) => None,
    }
}

/// Converts a winit key event into a raw event.
pub fn raw_event_from_winit(event: &KeyEvent) -> Option<RawKeyEvent> {
    let code = raw_key_from_winit(&event.physical_key)?;
    Some(RawKeyEvent {
        code,
        is_down: event.state == ElementState::Pressed,
    })
}

impl RawEventSender {
    /// Forward a winit key event. Returns `false` if the key is unknown or
    /// the source is gone.
    pub fn send_winit(&self, event: &KeyEvent) -> bool {
        raw_event_from_winit(event).is_some_and(|event| self.send(event))
    }
}

fn raw_key_from_winit_code(code: &KeyCode) -> Option<RawKeyCode> {
    let raw = match code {
        // Letters
        KeyCode::KeyA => RawKeyCode::A,
        KeyCode::KeyB => RawKeyCode::B,
        KeyCode::KeyC => RawKeyCode::C,
        KeyCode::KeyD => RawKeyCode::D,
        KeyCode::KeyE => RawKeyCode::E,
        KeyCode::KeyF => RawKeyCode::F,
        KeyCode::KeyG => RawKeyCode::G,
        KeyCode::KeyH => RawKeyCode::H,
        KeyCode::KeyI => RawKeyCode::I,
        KeyCode::KeyJ => RawKeyCode::J,
        KeyCode::KeyK => RawKeyCode::K,
        KeyCode::KeyL => RawKeyCode::L,
        KeyCode::KeyM => RawKeyCode::M,
        KeyCode::KeyN => RawKeyCode::N,
        KeyCode::KeyO => RawKeyCode::O,
        KeyCode::KeyP => RawKeyCode::P,
        KeyCode::KeyQ => RawKeyCode::Q,
        KeyCode::KeyR => RawKeyCode::R,
        KeyCode::KeyS => RawKeyCode::S,
        KeyCode::KeyT => RawKeyCode::T,
        KeyCode::KeyU => RawKeyCode::U,
        KeyCode::KeyV => RawKeyCode::V,
        KeyCode::KeyW => RawKeyCode::W,
        KeyCode::KeyX => RawKeyCode::X,
        KeyCode::KeyY => RawKeyCode::Y,
        KeyCode::KeyZ => RawKeyCode::Z,

        // Digits
        KeyCode::Digit0 => RawKeyCode::Digit0,
        KeyCode::Digit1 => RawKeyCode::Digit1,
        KeyCode::Digit2 => RawKeyCode::Digit2,
        KeyCode::Digit3 => RawKeyCode::Digit3,
        KeyCode::Digit4 => RawKeyCode::Digit4,
        KeyCode::Digit5 => RawKeyCode::Digit5,
        KeyCode::Digit6 => RawKeyCode::Digit6,
        KeyCode::Digit7 => RawKeyCode::Digit7,
        KeyCode::Digit8 => RawKeyCode::Digit8,
        KeyCode::Digit9 => RawKeyCode::Digit9,

        // Function keys
        KeyCode::F1 => RawKeyCode::F1,
        KeyCode::F2 => RawKeyCode::F2,
        KeyCode::F3 => RawKeyCode::F3,
        KeyCode::F4 => RawKeyCode::F4,
        KeyCode::F5 => RawKeyCode::F5,
        KeyCode::F6 => RawKeyCode::F6,
        KeyCode::F7 => RawKeyCode::F7,
        KeyCode::F8 => RawKeyCode::F8,
        KeyCode::F9 => RawKeyCode::F9,
        KeyCode::F10 => RawKeyCode::F10,
        KeyCode::F11 => RawKeyCode::F11,
        KeyCode::F12 => RawKeyCode::F12,
        KeyCode::F13 => RawKeyCode::F13,
        KeyCode::F14 => RawKeyCode::F14,
        KeyCode::F15 => RawKeyCode::F15,
        KeyCode::F16 => RawKeyCode::F16,
        KeyCode::F17 => RawKeyCode::F17,
        KeyCode::F18 => RawKeyCode::F18,
        KeyCode::F19 => RawKeyCode::F19,
        KeyCode::F20 => RawKeyCode::F20,
        KeyCode::F21 => RawKeyCode::F21,
        KeyCode::F22 => RawKeyCode::F22,
        KeyCode::F23 => RawKeyCode::F23,
        KeyCode::F24 => RawKeyCode::F24,

        // Punctuation
        KeyCode::Backquote => RawKeyCode::BackQuote,
        KeyCode::Minus => RawKeyCode::Minus,
        KeyCode::Equal => RawKeyCode::Equals,
        KeyCode::BracketLeft => RawKeyCode::OpenBracket,
        KeyCode::BracketRight => RawKeyCode::CloseBracket,
        KeyCode::Backslash => RawKeyCode::BackSlash,
        KeyCode::Semicolon => RawKeyCode::Semicolon,
        KeyCode::Quote => RawKeyCode::Quote,
        KeyCode::Comma => RawKeyCode::Comma,
        KeyCode::Period => RawKeyCode::Period,
        KeyCode::Slash => RawKeyCode::Slash,

        // Editing and navigation
        KeyCode::Escape => RawKeyCode::Escape,
        KeyCode::Backspace => RawKeyCode::Backspace,
        KeyCode::Tab => RawKeyCode::Tab,
        KeyCode::CapsLock => RawKeyCode::CapsLock,
        KeyCode::Enter => RawKeyCode::Enter,
        KeyCode::Space => RawKeyCode::Space,
        KeyCode::PrintScreen => RawKeyCode::PrintScreen,
        KeyCode::ScrollLock => RawKeyCode::ScrollLock,
        KeyCode::Pause => RawKeyCode::Pause,
        KeyCode::Insert => RawKeyCode::Insert,
        KeyCode::Delete => RawKeyCode::Delete,
        KeyCode::Home => RawKeyCode::Home,
        KeyCode::End => RawKeyCode::End,
        KeyCode::PageUp => RawKeyCode::PageUp,
        KeyCode::PageDown => RawKeyCode::PageDown,
        KeyCode::ArrowUp => RawKeyCode::Up,
        KeyCode::ArrowDown => RawKeyCode::Down,
        KeyCode::ArrowLeft => RawKeyCode::Left,
        KeyCode::ArrowRight => RawKeyCode::Right,
        KeyCode::ContextMenu => RawKeyCode::ContextMenu,

        // Numpad
        KeyCode::NumLock => RawKeyCode::NumLock,
        KeyCode::NumpadDivide => RawKeyCode::NumPadDivide,
        KeyCode::NumpadMultiply => RawKeyCode::NumPadMultiply,
        KeyCode::NumpadSubtract => RawKeyCode::NumPadSubtract,
        KeyCode::NumpadAdd => RawKeyCode::NumPadAdd,
        KeyCode::NumpadEnter => RawKeyCode::NumPadEnter,
        KeyCode::NumpadDecimal => RawKeyCode::NumPadDecimal,
        KeyCode::Numpad0 => RawKeyCode::NumPad0,
        KeyCode::Numpad1 => RawKeyCode::NumPad1,
        KeyCode::Numpad2 => RawKeyCode::NumPad2,
        KeyCode::Numpad3 => RawKeyCode::NumPad3,
        KeyCode::Numpad4 => RawKeyCode::NumPad4,
        KeyCode::Numpad5 => RawKeyCode::NumPad5,
        KeyCode::Numpad6 => RawKeyCode::NumPad6,
        KeyCode::Numpad7 => RawKeyCode::NumPad7,
        KeyCode::Numpad8 => RawKeyCode::NumPad8,
        KeyCode::Numpad9 => RawKeyCode::NumPad9,

        // Modifiers
        KeyCode::ShiftLeft => RawKeyCode::LeftShift,
        KeyCode::ShiftRight => RawKeyCode::RightShift,
        KeyCode::ControlLeft => RawKeyCode::LeftControl,
        KeyCode::ControlRight => RawKeyCode::RightControl,
        KeyCode::AltLeft => RawKeyCode::LeftAlt,
        KeyCode::AltRight => RawKeyCode::RightAlt,
        KeyCode::SuperLeft => RawKeyCode::LeftMeta,
        KeyCode::SuperRight => RawKeyCode::RightMeta,

        _ => return None,
    };
    Some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn test_physical_keys() {
        assert_eq!(
            raw_key_from_winit(&PhysicalKey::Code(KeyCode::KeyC)),
            Some(RawKeyCode::C)
        );
        assert_eq!(
            raw_key_from_winit(&PhysicalKey::Code(KeyCode::ArrowRight)),
            Some(RawKeyCode::Right)
        );
        assert_eq!(
            raw_key_from_winit(&PhysicalKey::Code(KeyCode::Backquote)),
            Some(RawKeyCode::BackQuote)
        );
    }

    #[test]
    fn test_super_maps_to_meta() {
        let left = raw_key_from_winit(&PhysicalKey::Code(KeyCode::SuperLeft));
        let right = raw_key_from_winit(&PhysicalKey::Code(KeyCode::SuperRight));
        assert_eq!(left, Some(RawKeyCode::LeftMeta));
        assert_eq!(right, Some(RawKeyCode::RightMeta));
        assert_eq!(left.and_then(RawKeyCode::modifier), right.and_then(RawKeyCode::modifier));
    }

    #[test]
    fn test_unknown_keys() {
        assert_eq!(
            raw_key_from_winit(&PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            None
        );
        assert_eq!(raw_key_from_winit(&PhysicalKey::Code(KeyCode::F35)), None);
        assert_eq!(raw_key_from_winit(&PhysicalKey::Code(KeyCode::AudioVolumeUp)), None);
    }
}
