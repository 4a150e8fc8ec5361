//! Service configuration.

use std::path::PathBuf;
use std::time::Duration;

use keyhook_core::DEFAULT_QUEUE_CAPACITY;

/// Default interval for polling sources.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Default log filter used by [`init_logging`](crate::init_logging) when
/// `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "keyhook=info,keyhook_core=info";

/// Configuration for a [`KeyboardService`](crate::KeyboardService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Keymap file to load bindings from. `None` means built-in defaults and
    /// no file access.
    pub keymap_path: Option<PathBuf>,
    /// Capacity of the execution context queue created by
    /// [`KeyboardService::with_context`](crate::KeyboardService::with_context).
    pub queue_capacity: usize,
    /// Sampling interval for polling sources.
    pub poll_interval: Duration,
    /// Whether dispatch starts enabled.
    pub start_enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            keymap_path: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            start_enabled: true,
        }
    }
}

impl ServiceConfig {
    /// Create a configuration that loads bindings from `path`.
    pub fn with_keymap(path: impl Into<PathBuf>) -> Self {
        Self {
            keymap_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Start building a configuration.
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::default()
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug, Default)]
pub struct ServiceBuilder {
    config: ServiceConfig,
}

impl ServiceBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load bindings from this keymap file.
    pub fn keymap_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.keymap_path = Some(path.into());
        self
    }

    /// Set the execution context queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the sampling interval for polling sources.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Start with dispatch disabled.
    pub fn start_disabled(mut self) -> Self {
        self.config.start_enabled = false;
        self
    }

    /// Finish building.
    pub fn build(self) -> ServiceConfig {
        self.config
    }
}
