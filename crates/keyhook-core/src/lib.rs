//! Core of keyhook: global key capture turned into abstract operations.
//!
//! This crate takes raw, platform-level key-down/key-up events, which report
//! left and right modifiers separately and arrive regardless of UI focus, and
//! decides which user-configurable [`Operation`], if any, each one stands for.
//! It never performs the operation itself; it hands the decision to a
//! single-threaded consumer without blocking the capture thread.
//!
//! # Pipeline
//!
//! ```text
//! RawEventSource ──► Dispatcher ──► ModifierTracker          (modifier keys)
//!   (own thread)        │
//!                       └─► KeyCombination ─► ShortcutRegistry::resolve
//!                                                   │
//!                       Signal<ShortcutTriggered> ◄─┘
//!                                 │ queued
//!                                 ▼
//!                       ExecutionContext (UI thread)
//! ```
//!
//! # Key Types
//!
//! - [`RawKeyCode`], [`LogicalModifier`], [`ModifierSet`] - key and modifier values
//! - [`KeyCombination`] - canonical, hashable "modifiers + key" with a text form
//! - [`Operation`] - the closed set of bindable actions, with `Nop` for "unbound"
//! - [`Bindings`] / [`ShortcutRegistry`] - configuration and O(1) resolution
//! - [`Dispatcher`] / [`DispatcherControl`] - per-event glue and its shared handle
//! - [`Signal`] / [`ExecutionContext`] - observer lists and the UI-thread queue
//! - [`RawEventSource`] / [`ChannelSource`] - where raw events come from
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use keyhook_core::{
//!     Bindings, ChannelSource, DispatcherControl, ExecutionContext, Operation,
//!     RawEventSource, RawKeyCode, ShortcutRegistry,
//! };
//!
//! let (registry, report) = ShortcutRegistry::with_bindings(&Bindings::defaults());
//! assert!(report.is_clean());
//!
//! let control = DispatcherControl::new(Arc::new(registry));
//! let (mut context, ui) = ExecutionContext::new(64);
//!
//! let ops = Arc::new(parking_lot::Mutex::new(Vec::new()));
//! let ops_clone = ops.clone();
//! control.on_triggered().connect_queued(&ui, move |event| {
//!     ops_clone.lock().push(event.operation);
//! });
//!
//! let (mut source, keys) = ChannelSource::new();
//! source.start(control.new_dispatcher().into_sink()).unwrap();
//!
//! keys.press(RawKeyCode::LeftShift);
//! keys.tap(RawKeyCode::F6);
//! keys.release(RawKeyCode::LeftShift);
//! source.stop();
//!
//! context.process_for(Duration::from_secs(1));
//! assert_eq!(*ops.lock(), vec![Operation::Rename]);
//! ```
//!
//! # Features
//!
//! - `winit`: convert winit key events ([`raw_key_from_winit`]).
//! - `global-hook`: OS-wide capture with [`PollingHook`].

pub mod bindings;
pub mod combination;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod key;
pub mod logging;
pub mod modifiers;
pub mod operation;
pub mod registry;
pub mod signal;
pub mod source;
pub mod tracker;

#[cfg(feature = "global-hook")]
pub mod global;
#[cfg(feature = "winit")]
pub mod winit_keys;

pub use bindings::{ALTERNATIVE_SEPARATOR, Bindings, split_alternatives};
pub use combination::{KeyCombination, TOKEN_SEPARATOR};
pub use context::{ContextHandle, DEFAULT_QUEUE_CAPACITY, ExecutionContext, QueuedInvocation};
pub use dispatcher::{Dispatcher, DispatcherControl, ShortcutTriggered};
pub use error::{Error, HookError, ParseError, Result, UnknownOperation};
pub use key::{MODIFIER_TABLE, RawKeyCode};
pub use modifiers::{LogicalModifier, ModifierSet};
pub use operation::Operation;
pub use registry::{BUILT_IN_BINDINGS, BindingSource, Diagnostic, KeyMap, LoadReport, ShortcutRegistry};
pub use signal::{ConnectionId, ConnectionType, Signal};
pub use source::{ChannelSource, EventSink, RawEventSender, RawEventSource, RawKeyEvent};
pub use tracker::ModifierTracker;

#[cfg(feature = "global-hook")]
pub use global::{DEFAULT_POLL_INTERVAL, PollingHook};
#[cfg(feature = "winit")]
pub use winit_keys::{raw_event_from_winit, raw_key_from_winit};

// Values handed from the capture thread to the consumer must be plain data.
static_assertions::assert_impl_all!(KeyCombination: Send, Sync, Copy);
static_assertions::assert_impl_all!(Operation: Send, Sync, Copy);
static_assertions::assert_impl_all!(ShortcutTriggered: Send, Sync, Clone);
static_assertions::assert_impl_all!(ShortcutRegistry: Send, Sync);
static_assertions::assert_impl_all!(Dispatcher: Send);
static_assertions::assert_impl_all!(DispatcherControl: Send, Sync);
static_assertions::assert_impl_all!(ContextHandle: Send, Sync);
static_assertions::assert_impl_all!(Signal<ShortcutTriggered>: Send, Sync);
