//! Error types for keyhook.

use std::io;
use std::path::PathBuf;

use keyhook_core::HookError;

/// Errors reading or writing a keymap file.
#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    /// The file could not be read or written.
    #[error("keymap I/O error at {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid keymap TOML.
    #[error("invalid keymap file {path}: {source}")]
    Parse {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// The keymap could not be serialized.
    #[error("failed to serialize keymap: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No platform configuration directory could be determined.
    #[error("could not determine the configuration directory")]
    NoConfigDir,
}

impl KeymapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// The main error type for keyhook.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Keymap file error.
    #[error(transparent)]
    Keymap(#[from] KeymapError),

    /// Event source error.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Core error.
    #[error(transparent)]
    Core(#[from] keyhook_core::Error),
}

/// A specialized Result type for keyhook.
pub type Result<T> = std::result::Result<T, Error>;
