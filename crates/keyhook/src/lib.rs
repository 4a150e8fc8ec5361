//! Global keyboard shortcuts with a persisted, user-editable keymap.
//!
//! `keyhook` wraps [`keyhook_core`] with the parts an application needs
//! around it: a TOML keymap file, service configuration, logging setup and
//! the [`KeyboardService`] that owns the capture source.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use keyhook::{ChannelSource, KeyboardService, Operation, RawKeyCode, ServiceConfig};
//!
//! let (service, mut ui) = KeyboardService::with_context(ServiceConfig::default());
//!
//! service.on_operation(|operation| match operation {
//!     Operation::Copy | Operation::Move => println!("transfer: {operation}"),
//!     Operation::Rename | Operation::Delete => println!("edit: {operation}"),
//!     Operation::Open
//!     | Operation::ExpandCurrentFolder
//!     | Operation::ExpandSelectedFolders
//!     | Operation::GoIntoCurrentFolder
//!     | Operation::GoBackToParentFolder
//!     | Operation::GotoFirstItem
//!     | Operation::GotoLastItem
//!     | Operation::SwitchTabInSamePanel
//!     | Operation::SwitchPanel
//!     | Operation::Refresh
//!     | Operation::NavigateUp => println!("navigate: {operation}"),
//!     Operation::Nop => {}
//! });
//!
//! let (source, keys) = ChannelSource::new();
//! service.start(source).unwrap();
//! keys.tap(RawKeyCode::F5);
//! service.stop();
//!
//! assert_eq!(ui.process_for(Duration::from_secs(1)), 1);
//! service.shutdown();
//! ```
//!
//! # Keymap Files
//!
//! See [`keymap`] for the file format. [`KeyboardService::new`] creates the
//! configured file with the default bindings on first run and falls back to
//! the defaults if it cannot be read.

pub mod config;
pub mod error;
pub mod keymap;
pub mod logging;
pub mod service;

pub use config::{DEFAULT_LOG_FILTER, DEFAULT_POLL_INTERVAL, ServiceBuilder, ServiceConfig};
pub use error::{Error, KeymapError, Result};
pub use keymap::{
    KEYMAP_FILE_NAME, default_keymap_path, keymap_to_string, load_keymap,
    load_keymap_or_default, parse_keymap, read_keymap, save_keymap,
};
pub use logging::init_logging;
pub use service::{KeyboardService, Subscription};

pub use keyhook_core::{
    Bindings, ChannelSource, ContextHandle, Diagnostic, EventSink, ExecutionContext, HookError,
    KeyCombination, LoadReport, LogicalModifier, ModifierSet, Operation, RawEventSender,
    RawEventSource, RawKeyCode, RawKeyEvent, ShortcutRegistry, ShortcutTriggered,
};
