//! Per-event glue between a raw event source and the registry.
//!
//! A [`Dispatcher`] is owned by the capture thread. For every raw event it
//! either updates its [`ModifierTracker`] (modifier keys, up or down) or, on a
//! non-modifier key-down, snapshots the held modifiers, builds a
//! [`KeyCombination`], resolves it and emits [`ShortcutTriggered`] when an
//! operation is bound. Key-ups of non-modifier keys are ignored.
//!
//! The state the application touches from other threads (enabled flag,
//! shutdown flag, registry, signals) lives behind a [`DispatcherControl`].
//!
//! ```
//! use std::sync::Arc;
//! use keyhook_core::{Dispatcher, Operation, RawKeyCode, RawKeyEvent, ShortcutRegistry};
//!
//! let registry = Arc::new(ShortcutRegistry::new());
//! let mut dispatcher = Dispatcher::new(registry);
//!
//! assert_eq!(dispatcher.handle(RawKeyEvent::down(RawKeyCode::Home)), Some(Operation::GotoFirstItem));
//! assert_eq!(dispatcher.handle(RawKeyEvent::down(RawKeyCode::LeftShift)), None);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::combination::KeyCombination;
use crate::logging::targets;
use crate::operation::Operation;
use crate::registry::ShortcutRegistry;
use crate::signal::Signal;
use crate::source::{EventSink, RawKeyEvent};
use crate::tracker::ModifierTracker;

/// Delivered when a key combination resolves to a bound operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutTriggered {
    /// The resolved operation. Never `Nop`.
    pub operation: Operation,
    /// The combination that was pressed.
    pub combination: KeyCombination,
    /// Canonical text of `combination`.
    pub text: String,
}

struct DispatchShared {
    enabled: AtomicBool,
    shut_down: AtomicBool,
    registry: Arc<ShortcutRegistry>,
    triggered: Signal<ShortcutTriggered>,
    observed: Signal<KeyCombination>,
}

/// Thread-safe handle to the shared side of a dispatcher. Cheap to clone.
#[derive(Clone)]
pub struct DispatcherControl {
    shared: Arc<DispatchShared>,
}

impl DispatcherControl {
    /// Create the shared dispatch state for `registry`. Dispatch starts
    /// enabled.
    pub fn new(registry: Arc<ShortcutRegistry>) -> Self {
        Self {
            shared: Arc::new(DispatchShared {
                enabled: AtomicBool::new(true),
                shut_down: AtomicBool::new(false),
                registry,
                triggered: Signal::new(),
                observed: Signal::new(),
            }),
        }
    }

    /// A fresh dispatcher, with nothing held, sharing this control.
    ///
    /// Create a new one whenever a source is (re)started so stale modifier
    /// state from a previous run cannot leak in.
    pub fn new_dispatcher(&self) -> Dispatcher {
        Dispatcher {
            tracker: ModifierTracker::new(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Turn resolution and delivery on or off. Modifier tracking continues
    /// while disabled, so re-enabling mid-chord sees the correct modifiers.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::Release);
        tracing::debug!(target: targets::DISPATCH, enabled, "dispatch enabled changed");
    }

    /// Whether dispatch is enabled.
    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    /// Make every dispatcher of this control inert and disconnect all slots.
    ///
    /// Returns `true` on the first call only; later calls do nothing.
    pub fn shutdown(&self) -> bool {
        if self.shared.shut_down.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.shared.triggered.disconnect_all();
        self.shared.observed.disconnect_all();
        tracing::debug!(target: targets::DISPATCH, "dispatch shut down");
        true
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shared.shut_down.load(Ordering::Acquire)
    }

    /// The registry combinations are resolved against.
    pub fn registry(&self) -> &Arc<ShortcutRegistry> {
        &self.shared.registry
    }

    /// Emitted for every combination that resolves to a bound operation.
    pub fn on_triggered(&self) -> &Signal<ShortcutTriggered> {
        &self.shared.triggered
    }

    /// Emitted for every combination built from a non-modifier key-down,
    /// whether or not anything is bound to it.
    pub fn on_observed(&self) -> &Signal<KeyCombination> {
        &self.shared.observed
    }
}

impl fmt::Debug for DispatcherControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherControl")
            .field("enabled", &self.is_enabled())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

/// Capture-thread side: owns the modifier tracker.
pub struct Dispatcher {
    tracker: ModifierTracker,
    shared: Arc<DispatchShared>,
}

impl Dispatcher {
    /// A dispatcher with its own fresh control.
    pub fn new(registry: Arc<ShortcutRegistry>) -> Self {
        DispatcherControl::new(registry).new_dispatcher()
    }

    /// A control handle sharing this dispatcher's state.
    pub fn control(&self) -> DispatcherControl {
        DispatcherControl {
            shared: Arc::clone(&self.shared),
        }
    }

    /// The modifier tracker.
    pub fn tracker(&self) -> &ModifierTracker {
        &self.tracker
    }

    /// Handle one raw event. Returns the operation that was delivered, if any.
    #[tracing::instrument(skip_all, target = "keyhook_core::dispatch", level = "trace")]
    pub fn handle(&mut self, event: RawKeyEvent) -> Option<Operation> {
        if self.shared.shut_down.load(Ordering::Acquire) {
            return None;
        }

        if event.code.is_modifier() {
            if event.is_down {
                self.tracker.on_modifier_down(event.code);
            } else {
                self.tracker.on_modifier_up(event.code);
            }
            return None;
        }

        if !event.is_down || !self.shared.enabled.load(Ordering::Acquire) {
            return None;
        }

        let combination = KeyCombination::normalize(self.tracker.current_set(), event.code);
        self.shared.observed.emit(combination);

        let operation = self.shared.registry.resolve(&combination);
        if !operation.is_bound() {
            tracing::trace!(target: targets::DISPATCH, %combination, "unbound");
            return None;
        }

        tracing::debug!(target: targets::DISPATCH, %combination, %operation, "dispatching");
        self.shared.triggered.emit(ShortcutTriggered {
            operation,
            combination,
            text: combination.to_string(),
        });
        Some(operation)
    }

    /// Box this dispatcher as a source sink.
    pub fn into_sink(mut self) -> EventSink {
        Box::new(move |event| {
            self.handle(event);
        })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("held", &self.tracker.held_count())
            .finish()
    }
}
