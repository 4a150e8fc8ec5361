//! Raw keyboard event sources.
//!
//! A [`RawEventSource`] delivers [`RawKeyEvent`]s to a sink on its own thread.
//! The sink is usually a [`Dispatcher`](crate::Dispatcher) moved into the
//! source, which makes the source thread the only writer of modifier state.
//!
//! [`ChannelSource`] is the in-process implementation: anything holding a
//! [`RawEventSender`] can feed it, whether that is a windowing event loop
//! forwarding its key events or a test.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::error::HookError;
use crate::key::RawKeyCode;
use crate::logging::targets;

/// How long an idle source thread waits before re-checking for shutdown.
const IDLE_TICK: Duration = Duration::from_millis(25);

/// One key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawKeyEvent {
    /// The physical key.
    pub code: RawKeyCode,
    /// `true` for key-down, `false` for key-up.
    pub is_down: bool,
}

impl RawKeyEvent {
    /// A key-down event.
    pub fn down(code: RawKeyCode) -> Self {
        Self {
            code,
            is_down: true,
        }
    }

    /// A key-up event.
    pub fn up(code: RawKeyCode) -> Self {
        Self {
            code,
            is_down: false,
        }
    }
}

/// Receiver of raw events, called on the source's thread.
pub type EventSink = Box<dyn FnMut(RawKeyEvent) + Send + 'static>;

/// A producer of raw key events.
///
/// Implementations call the sink from a single thread of their own and never
/// from the thread that called [`start`](Self::start).
pub trait RawEventSource: Send {
    /// Begin delivering events to `sink`.
    ///
    /// Fails with [`HookError::AlreadyRunning`] if the source is running, or
    /// with another [`HookError`] if it cannot be started at all.
    fn start(&mut self, sink: EventSink) -> Result<(), HookError>;

    /// Stop delivering events and wait for the source thread to exit.
    /// Stopping a stopped source is a no-op.
    fn stop(&mut self);

    /// Returns true between a successful `start` and the next `stop`.
    fn is_running(&self) -> bool;
}

/// Feeds events into a [`ChannelSource`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RawEventSender {
    sender: Sender<RawKeyEvent>,
}

impl RawEventSender {
    /// Queue one event. Returns `false` if the source has been dropped.
    pub fn send(&self, event: RawKeyEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    /// Queue a key-down.
    pub fn press(&self, code: RawKeyCode) -> bool {
        self.send(RawKeyEvent::down(code))
    }

    /// Queue a key-up.
    pub fn release(&self, code: RawKeyCode) -> bool {
        self.send(RawKeyEvent::up(code))
    }

    /// Queue a key-down followed by a key-up.
    pub fn tap(&self, code: RawKeyCode) -> bool {
        self.press(code) && self.release(code)
    }
}

/// A source fed through a channel.
///
/// Events sent before [`start`](RawEventSource::start) are buffered and
/// delivered once the source runs. [`stop`](RawEventSource::stop) delivers
/// everything queued before it was called and returns even while another
/// thread keeps sending. The source can be started again afterwards.
pub struct ChannelSource {
    receiver: Option<Receiver<RawKeyEvent>>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<Receiver<RawKeyEvent>>>,
}

impl ChannelSource {
    /// Create a source and the sender that feeds it.
    pub fn new() -> (Self, RawEventSender) {
        let (sender, receiver) = unbounded();
        let source = Self {
            receiver: Some(receiver),
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        };
        (source, RawEventSender { sender })
    }
}

impl RawEventSource for ChannelSource {
    fn start(&mut self, mut sink: EventSink) -> Result<(), HookError> {
        if self.is_running() {
            return Err(HookError::AlreadyRunning);
        }
        let receiver = self
            .receiver
            .take()
            .ok_or_else(|| HookError::Unavailable("channel receiver was lost".into()))?;

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);

        let spawned = thread::Builder::new()
            .name("keyhook-channel-source".into())
            .spawn(move || {
                tracing::debug!(target: targets::SOURCE, "channel source started");
                loop {
                    if !running.load(Ordering::Acquire) {
                        // Deliver what was queued before the stop, nothing sent after.
                        let backlog = receiver.len();
                        for event in receiver.try_iter().take(backlog) {
                            sink(event);
                        }
                        break;
                    }
                    match receiver.recv_timeout(IDLE_TICK) {
                        Ok(event) => sink(event),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!(target: targets::SOURCE, "channel source stopped");
                receiver
            });

        match spawned {
            Ok(handle) => {
                self.thread = Some(handle);
                Ok(())
            }
            Err(err) => {
                // The receiver moved into the closure that failed to spawn.
                self.running.store(false, Ordering::Release);
                Err(HookError::Spawn(err))
            }
        }
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            match handle.join() {
                Ok(receiver) => self.receiver = Some(receiver),
                Err(_) => {
                    tracing::error!(target: targets::SOURCE, "channel source thread panicked")
                }
            }
        }
    }

    fn is_running(&self) -> bool {
        self.thread.is_some() && self.running.load(Ordering::Acquire)
    }
}

impl Drop for ChannelSource {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for ChannelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSource")
            .field("running", &self.is_running())
            .finish()
    }
}
