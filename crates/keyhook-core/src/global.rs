//! OS-wide keyboard capture by polling.
//!
//! [`PollingHook`] samples the set of pressed keys on a dedicated thread and
//! turns the difference between two samples into key-up and key-down
//! events. It sees keys regardless of which window has focus.
//!
//! Platform notes: on Linux this needs an X11 display; on macOS the process
//! needs the Input Monitoring permission.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::bounded;
use device_query::{DeviceQuery, DeviceState, Keycode};

use crate::error::HookError;
use crate::key::RawKeyCode;
use crate::logging::targets;
use crate::source::{EventSink, RawEventSource, RawKeyEvent};

/// Default interval between two samples.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A polling, OS-wide keyboard source.
pub struct PollingHook {
    interval: Duration,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Default for PollingHook {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl PollingHook {
    /// Create a hook that samples every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// The sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the polling thread around the sampler returned by `open`.
    ///
    /// `open` runs on the polling thread. `start_with` returns only after it
    /// has reported back, so a device that cannot be opened is a start
    /// failure rather than a dead thread.
    fn start_with<S, F>(&mut self, mut sink: EventSink, open: F) -> Result<(), HookError>
    where
        S: KeySampler,
        F: FnOnce() -> Option<S> + Send + 'static,
    {
        if self.is_running() {
            return Err(HookError::AlreadyRunning);
        }
        // Reap a thread that exited on its own.
        self.stop();

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let interval = self.interval;
        let (ready_tx, ready_rx) = bounded::<bool>(1);

        let handle = thread::Builder::new()
            .name("keyhook-polling-hook".into())
            .spawn(move || {
                // The device handle is not Send on every platform; open it here.
                let Some(sampler) = open() else {
                    let _ = ready_tx.send(false);
                    return;
                };
                let _ = ready_tx.send(true);

                let mut previous: HashSet<RawKeyCode> = HashSet::new();
                tracing::info!(target: targets::SOURCE, ?interval, "polling hook started");

                while running.load(Ordering::Acquire) {
                    let current = sampler.pressed();
                    for event in diff(&previous, &current) {
                        sink(event);
                    }
                    previous = current;

                    thread::sleep(interval);
                }
                tracing::info!(target: targets::SOURCE, "polling hook stopped");
            })
            .map_err(|err| {
                self.running.store(false, Ordering::Release);
                HookError::Spawn(err)
            })?;

        match ready_rx.recv() {
            Ok(true) => {
                self.thread = Some(handle);
                Ok(())
            }
            Ok(false) | Err(_) => {
                self.running.store(false, Ordering::Release);
                if handle.join().is_err() {
                    tracing::error!(target: targets::SOURCE, "polling hook thread panicked on startup");
                }
                tracing::error!(target: targets::SOURCE, "keyboard device unavailable");
                Err(HookError::Unavailable(
                    "cannot open the keyboard device (no display, or input monitoring not permitted)"
                        .into(),
                ))
            }
        }
    }
}

/// Source of the currently pressed keys.
trait KeySampler {
    fn pressed(&self) -> HashSet<RawKeyCode>;
}

impl KeySampler for DeviceState {
    fn pressed(&self) -> HashSet<RawKeyCode> {
        self.get_keys().iter().filter_map(raw_key_from_device).collect()
    }
}

impl RawEventSource for PollingHook {
    /// Fails with [`HookError::Unavailable`] when the keyboard state cannot
    /// be read: no X display on Linux, or the accessibility permission
    /// missing on macOS.
    fn start(&mut self, sink: EventSink) -> Result<(), HookError> {
        self.start_with(sink, DeviceState::checked_new)
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::error!(target: targets::SOURCE, "polling hook thread panicked");
            }
        }
    }

    fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|handle| !handle.is_finished())
            && self.running.load(Ordering::Acquire)
    }
}

impl Drop for PollingHook {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for PollingHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingHook")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Events that turn `previous` into `current`: releases first, then presses,
/// each group with modifiers ahead of other keys.
fn diff(previous: &HashSet<RawKeyCode>, current: &HashSet<RawKeyCode>) -> Vec<RawKeyEvent> {
    let mut released: Vec<_> = previous.difference(current).copied().collect();
    let mut pressed: Vec<_> = current.difference(previous).copied().collect();
    released.sort_by_key(|code| (!code.is_modifier(), *code));
    pressed.sort_by_key(|code| (!code.is_modifier(), *code));

    released
        .into_iter()
        .map(RawKeyEvent::up)
        .chain(pressed.into_iter().map(RawKeyEvent::down))
        .collect()
}

fn raw_key_from_device(key: &Keycode) -> Option<RawKeyCode> {
    let raw = match key {
        Keycode::A => RawKeyCode::A,
        Keycode::B => RawKeyCode::B,
        Keycode::C => RawKeyCode::C,
        Keycode::D => RawKeyCode::D,
        Keycode::E => RawKeyCode::E,
        Keycode::F => RawKeyCode::F,
        Keycode::G => RawKeyCode::G,
        Keycode::H => RawKeyCode::H,
        Keycode::I => RawKeyCode::I,
        Keycode::J => RawKeyCode::J,
        Keycode::K => RawKeyCode::K,
        Keycode::L => RawKeyCode::L,
        Keycode::M => RawKeyCode::M,
        Keycode::N => RawKeyCode::N,
        Keycode::O => RawKeyCode::O,
        Keycode::P => RawKeyCode::P,
        Keycode::Q => RawKeyCode::Q,
        Keycode::R => RawKeyCode::R,
        Keycode::S => RawKeyCode::S,
        Keycode::T => RawKeyCode::T,
        Keycode::U => RawKeyCode::U,
        Keycode::V => RawKeyCode::V,
        Keycode::W => RawKeyCode::W,
        Keycode::X => RawKeyCode::X,
        Keycode::Y => RawKeyCode::Y,
        Keycode::Z => RawKeyCode::Z,
        Keycode::Key0 => RawKeyCode::Digit0,
        Keycode::Key1 => RawKeyCode::Digit1,
        Keycode::Key2 => RawKeyCode::Digit2,
        Keycode::Key3 => RawKeyCode::Digit3,
        Keycode::Key4 => RawKeyCode::Digit4,
        Keycode::Key5 => RawKeyCode::Digit5,
        Keycode::Key6 => RawKeyCode::Digit6,
        Keycode::Key7 => RawKeyCode::Digit7,
        Keycode::Key8 => RawKeyCode::Digit8,
        Keycode::Key9 => RawKeyCode::Digit9,
        Keycode::F1 => RawKeyCode::F1,
        Keycode::F2 => RawKeyCode::F2,
        Keycode::F3 => RawKeyCode::F3,
        Keycode::F4 => RawKeyCode::F4,
        Keycode::F5 => RawKeyCode::F5,
        Keycode::F6 => RawKeyCode::F6,
        Keycode::F7 => RawKeyCode::F7,
        Keycode::F8 => RawKeyCode::F8,
        Keycode::F9 => RawKeyCode::F9,
        Keycode::F10 => RawKeyCode::F10,
        Keycode::F11 => RawKeyCode::F11,
        Keycode::F12 => RawKeyCode::F12,
        Keycode::F13 => RawKeyCode::F13,
        Keycode::F14 => RawKeyCode::F14,
        Keycode::F15 => RawKeyCode::F15,
        Keycode::F16 => RawKeyCode::F16,
        Keycode::F17 => RawKeyCode::F17,
        Keycode::F18 => RawKeyCode::F18,
        Keycode::F19 => RawKeyCode::F19,
        Keycode::F20 => RawKeyCode::F20,
        Keycode::Escape => RawKeyCode::Escape,
        Keycode::Space => RawKeyCode::Space,
        Keycode::Enter => RawKeyCode::Enter,
        Keycode::Tab => RawKeyCode::Tab,
        Keycode::Backspace => RawKeyCode::Backspace,
        Keycode::Delete => RawKeyCode::Delete,
        Keycode::Insert => RawKeyCode::Insert,
        Keycode::Home => RawKeyCode::Home,
        Keycode::End => RawKeyCode::End,
        Keycode::PageUp => RawKeyCode::PageUp,
        Keycode::PageDown => RawKeyCode::PageDown,
        Keycode::Up => RawKeyCode::Up,
        Keycode::Down => RawKeyCode::Down,
        Keycode::Left => RawKeyCode::Left,
        Keycode::Right => RawKeyCode::Right,
        Keycode::Minus => RawKeyCode::Minus,
        Keycode::Equal => RawKeyCode::Equals,
        Keycode::LeftBracket => RawKeyCode::OpenBracket,
        Keycode::RightBracket => RawKeyCode::CloseBracket,
        Keycode::BackSlash => RawKeyCode::BackSlash,
        Keycode::Semicolon => RawKeyCode::Semicolon,
        Keycode::Apostrophe => RawKeyCode::Quote,
        Keycode::Grave => RawKeyCode::BackQuote,
        Keycode::Comma => RawKeyCode::Comma,
        Keycode::Dot => RawKeyCode::Period,
        Keycode::Slash => RawKeyCode::Slash,
        Keycode::LShift => RawKeyCode::LeftShift,
        Keycode::RShift => RawKeyCode::RightShift,
        Keycode::LControl => RawKeyCode::LeftControl,
        Keycode::RControl => RawKeyCode::RightControl,
        Keycode::LAlt => RawKeyCode::LeftAlt,
        Keycode::RAlt => RawKeyCode::RightAlt,
        Keycode::LMeta => RawKeyCode::LeftMeta,
        Keycode::RMeta => RawKeyCode::RightMeta,
        _ => return None,
    };
    Some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn set(codes: &[RawKeyCode]) -> HashSet<RawKeyCode> {
        codes.iter().copied().collect()
    }

    #[test]
    fn test_diff_orders_modifiers_first() {
        let events = diff(&set(&[]), &set(&[RawKeyCode::C, RawKeyCode::LeftControl]));
        assert_eq!(
            events,
            vec![
                RawKeyEvent::down(RawKeyCode::LeftControl),
                RawKeyEvent::down(RawKeyCode::C),
            ]
        );
    }

    #[test]
    fn test_diff_releases_before_presses() {
        let events = diff(&set(&[RawKeyCode::A]), &set(&[RawKeyCode::B]));
        assert_eq!(
            events,
            vec![RawKeyEvent::up(RawKeyCode::A), RawKeyEvent::down(RawKeyCode::B)]
        );
        assert!(diff(&set(&[RawKeyCode::A]), &set(&[RawKeyCode::A])).is_empty());
    }

    struct ScriptedKeyboard {
        pressed: Arc<Mutex<HashSet<RawKeyCode>>>,
    }

    impl KeySampler for ScriptedKeyboard {
        fn pressed(&self) -> HashSet<RawKeyCode> {
            self.pressed.lock().clone()
        }
    }

    fn channel_sink() -> (EventSink, crossbeam_channel::Receiver<RawKeyEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let sink: EventSink = Box::new(move |event| {
            let _ = tx.send(event);
        });
        (sink, rx)
    }

    #[test]
    fn test_unavailable_device_fails_start() {
        let mut hook = PollingHook::new(Duration::from_millis(5));
        let (sink, _events) = channel_sink();

        let result = hook.start_with(sink, || None::<ScriptedKeyboard>);

        assert!(matches!(result, Err(HookError::Unavailable(_))));
        assert!(!hook.is_running());
        assert!(hook.thread.is_none());
    }

    #[test]
    fn test_start_after_failed_start() {
        let mut hook = PollingHook::new(Duration::from_millis(5));
        let (sink, _) = channel_sink();
        assert!(hook.start_with(sink, || None::<ScriptedKeyboard>).is_err());

        let pressed = Arc::new(Mutex::new(HashSet::new()));
        let keyboard = ScriptedKeyboard {
            pressed: pressed.clone(),
        };
        let (sink, events) = channel_sink();
        hook.start_with(sink, move || Some(keyboard)).unwrap();
        assert!(hook.is_running());

        pressed.lock().insert(RawKeyCode::F5);
        assert_eq!(
            events.recv_timeout(Duration::from_secs(2)).unwrap(),
            RawKeyEvent::down(RawKeyCode::F5)
        );
        pressed.lock().clear();
        assert_eq!(
            events.recv_timeout(Duration::from_secs(2)).unwrap(),
            RawKeyEvent::up(RawKeyCode::F5)
        );

        hook.stop();
        assert!(!hook.is_running());
    }

    #[test]
    fn test_device_keys() {
        assert_eq!(raw_key_from_device(&Keycode::LMeta), Some(RawKeyCode::LeftMeta));
        assert_eq!(raw_key_from_device(&Keycode::Grave), Some(RawKeyCode::BackQuote));
        assert_eq!(raw_key_from_device(&Keycode::Key7), Some(RawKeyCode::Digit7));
    }
}
