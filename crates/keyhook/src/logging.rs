//! Logging setup.
//!
//! keyhook logs through `tracing`. Libraries embedding it normally install
//! their own subscriber; [`init_logging`] is a convenience for binaries and
//! tests.

use tracing_subscriber::EnvFilter;

/// Target names for log filtering.
pub mod targets {
    /// Keymap file loading and saving.
    pub const KEYMAP: &str = "keyhook::keymap";
    /// Service lifecycle.
    pub const SERVICE: &str = "keyhook::service";
}

/// Install a formatting subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` if a
/// global subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init()
        .is_ok()
}
