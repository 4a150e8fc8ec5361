//! The keyboard service.
//!
//! [`KeyboardService`] wires a raw event source, a fresh [`Dispatcher`] per
//! run, the shortcut registry and the consumer's [`ExecutionContext`]
//! together. It is constructed explicitly; nothing is global, so tests and
//! embedders can run as many services as they like with any source.
//!
//! [`Dispatcher`]: keyhook_core::Dispatcher

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use keyhook_core::{
    Bindings, ConnectionId, ContextHandle, DispatcherControl, ExecutionContext, HookError,
    KeyCombination, LoadReport, Operation, RawEventSource, ShortcutRegistry, ShortcutTriggered,
};
use parking_lot::Mutex;

use crate::config::ServiceConfig;
use crate::error::{KeymapError, Result};
use crate::keymap;
use crate::logging::targets;

/// Handle for a subscription made through a [`KeyboardService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    signal: SubscribedSignal,
    id: ConnectionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SubscribedSignal {
    Triggered,
    Observed,
}

/// Global keyboard shortcut service.
pub struct KeyboardService {
    config: ServiceConfig,
    control: DispatcherControl,
    context: ContextHandle,
    source: Mutex<Option<Box<dyn RawEventSource>>>,
    last_report: Mutex<LoadReport>,
}

impl KeyboardService {
    /// Create a service delivering to `context`.
    ///
    /// Bindings come from `config.keymap_path` when set (created with the
    /// defaults on first run, defaults on any load error) and from
    /// [`Bindings::defaults`] otherwise.
    pub fn new(config: ServiceConfig, context: ContextHandle) -> Self {
        let bindings = match &config.keymap_path {
            Some(path) => keymap::load_keymap_or_default(path),
            None => Bindings::defaults(),
        };
        let (registry, report) = ShortcutRegistry::with_bindings(&bindings);

        let control = DispatcherControl::new(Arc::new(registry));
        control.set_enabled(config.start_enabled);

        tracing::debug!(
            target: targets::SERVICE,
            bindings = bindings.len(),
            diagnostics = report.diagnostics().len(),
            "keyboard service created"
        );

        Self {
            config,
            control,
            context,
            source: Mutex::new(None),
            last_report: Mutex::new(report),
        }
    }

    /// Create a service together with the execution context it delivers to.
    /// The context's queue holds `config.queue_capacity` invocations.
    pub fn with_context(config: ServiceConfig) -> (Self, ExecutionContext) {
        let (context, handle) = ExecutionContext::new(config.queue_capacity);
        (Self::new(config, handle), context)
    }

    /// The configuration this service was created with.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Start capturing from `source`.
    ///
    /// The source receives a fresh dispatcher, so no modifier state carries
    /// over from an earlier run.
    pub fn start<S>(&self, source: S) -> std::result::Result<(), HookError>
    where
        S: RawEventSource + 'static,
    {
        self.start_boxed(Box::new(source))
    }

    /// Like [`start`](Self::start) for an already boxed source.
    pub fn start_boxed(&self, mut source: Box<dyn RawEventSource>) -> std::result::Result<(), HookError> {
        let mut slot = self.source.lock();
        if self.control.is_shut_down() {
            return Err(HookError::ShutDown);
        }
        if slot.as_ref().is_some_and(|running| running.is_running()) {
            return Err(HookError::AlreadyRunning);
        }

        if let Err(err) = source.start(self.control.new_dispatcher().into_sink()) {
            tracing::error!(target: targets::SERVICE, error = %err, "failed to start event source");
            return Err(err);
        }
        // A shutdown that raced with the start above must not leave it running.
        if self.control.is_shut_down() {
            source.stop();
            return Err(HookError::ShutDown);
        }
        if let Some(mut previous) = slot.replace(source) {
            previous.stop();
        }
        tracing::info!(target: targets::SERVICE, "keyboard capture started");
        Ok(())
    }

    /// Start the OS-wide polling hook.
    #[cfg(feature = "global-hook")]
    pub fn start_global(&self) -> std::result::Result<(), HookError> {
        self.start(keyhook_core::PollingHook::new(self.config.poll_interval))
    }

    /// Stop the current source, delivering what it has already captured.
    /// The service can be started again afterwards.
    pub fn stop(&self) {
        if let Some(mut source) = self.source.lock().take() {
            source.stop();
            tracing::info!(target: targets::SERVICE, "keyboard capture stopped");
        }
    }

    /// Shut the service down for good.
    ///
    /// Dispatch becomes inert first, so events still in flight are absorbed
    /// and every subscription is dropped; then the source is stopped. Every
    /// call stops the source, but only the first returns `true`.
    pub fn shutdown(&self) -> bool {
        let first = self.control.shutdown();
        self.stop();
        if first {
            tracing::info!(target: targets::SERVICE, "keyboard service shut down");
        }
        first
    }

    /// Whether a source is currently delivering events.
    pub fn is_running(&self) -> bool {
        self.source
            .lock()
            .as_ref()
            .is_some_and(|source| source.is_running())
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.control.is_shut_down()
    }

    /// Enable or disable dispatch. Modifier tracking continues either way.
    pub fn set_enabled(&self, enabled: bool) {
        self.control.set_enabled(enabled);
    }

    /// Whether dispatch is enabled.
    pub fn is_enabled(&self) -> bool {
        self.control.is_enabled()
    }

    /// The shared dispatch control.
    pub fn control(&self) -> &DispatcherControl {
        &self.control
    }

    /// The shortcut registry.
    pub fn registry(&self) -> &Arc<ShortcutRegistry> {
        self.control.registry()
    }

    /// Diagnostics from the most recent load or edit.
    pub fn last_report(&self) -> LoadReport {
        self.last_report.lock().clone()
    }

    /// Replace all bindings.
    pub fn reload(&self, bindings: &Bindings) -> LoadReport {
        let report = self.registry().load(bindings);
        self.remember(report)
    }

    /// Replace all bindings with the contents of a keymap file.
    pub fn reload_from_file(&self, path: impl AsRef<Path>) -> std::result::Result<LoadReport, KeymapError> {
        let bindings = keymap::read_keymap(path)?;
        Ok(self.reload(&bindings))
    }

    /// Re-read the configured keymap file.
    pub fn reload_keymap(&self) -> Result<LoadReport> {
        let path = self.keymap_path()?;
        Ok(self.reload_from_file(path)?)
    }

    /// Rebind one operation.
    pub fn set_binding(&self, operation: Operation, alternatives: &str) -> LoadReport {
        let report = self.registry().set_binding(operation, alternatives);
        self.remember(report)
    }

    /// Write the current user bindings to `path`.
    pub fn save_keymap_to(&self, path: impl AsRef<Path>) -> std::result::Result<(), KeymapError> {
        keymap::save_keymap(path, &self.registry().bindings())
    }

    /// Write the current user bindings to the configured keymap file.
    pub fn save_keymap(&self) -> Result<()> {
        let path = self.keymap_path()?;
        Ok(self.save_keymap_to(path)?)
    }

    /// Call `slot` on the execution context for every triggered operation.
    pub fn on_operation<F>(&self, slot: F) -> Subscription
    where
        F: Fn(Operation) + Send + Sync + 'static,
    {
        self.on_triggered(move |event| slot(event.operation))
    }

    /// Call `slot` on the execution context for every triggered shortcut.
    pub fn on_triggered<F>(&self, slot: F) -> Subscription
    where
        F: Fn(&ShortcutTriggered) + Send + Sync + 'static,
    {
        Subscription {
            signal: SubscribedSignal::Triggered,
            id: self.control.on_triggered().connect_queued(&self.context, slot),
        }
    }

    /// Call `slot` on the execution context for every pressed combination,
    /// bound or not.
    pub fn on_combination<F>(&self, slot: F) -> Subscription
    where
        F: Fn(&KeyCombination) + Send + Sync + 'static,
    {
        Subscription {
            signal: SubscribedSignal::Observed,
            id: self.control.on_observed().connect_queued(&self.context, slot),
        }
    }

    /// Remove a subscription. Returns `false` if it was already removed.
    pub fn disconnect(&self, subscription: Subscription) -> bool {
        match subscription.signal {
            SubscribedSignal::Triggered => self.control.on_triggered().disconnect(subscription.id),
            SubscribedSignal::Observed => self.control.on_observed().disconnect(subscription.id),
        }
    }

    fn keymap_path(&self) -> std::result::Result<PathBuf, KeymapError> {
        match &self.config.keymap_path {
            Some(path) => Ok(path.clone()),
            None => keymap::default_keymap_path(),
        }
    }

    fn remember(&self, report: LoadReport) -> LoadReport {
        *self.last_report.lock() = report.clone();
        report
    }
}

impl Drop for KeyboardService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for KeyboardService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardService")
            .field("running", &self.is_running())
            .field("enabled", &self.is_enabled())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
