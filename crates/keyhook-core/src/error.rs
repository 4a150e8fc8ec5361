//! Error types for keyhook-core.

use std::io;

/// Errors produced while parsing the textual form of a key combination.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A token was neither a modifier nor a known key name.
    #[error("unknown key name '{0}'")]
    UnknownKey(String),

    /// The key token names a modifier key such as `leftcontrol`.
    #[error("'{0}' is a modifier key and cannot be the key of a combination")]
    ModifierAsKey(String),

    /// Only modifiers were given.
    #[error("combination has modifiers but no key")]
    MissingKey,
}

/// An operation name that does not match any [`Operation`](crate::Operation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

/// Errors reported by raw event sources.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// `start` was called on a source that is already delivering events.
    #[error("event source is already running")]
    AlreadyRunning,

    /// The owning service has been shut down.
    #[error("keyboard service has been shut down")]
    ShutDown,

    /// The platform hook could not be installed.
    #[error("keyboard hook unavailable: {0}")]
    Unavailable(String),

    /// The capture thread could not be spawned.
    #[error("failed to spawn capture thread: {0}")]
    Spawn(#[from] io::Error),
}

/// The main error type for keyhook-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key combination parse error.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Unknown operation name.
    #[error(transparent)]
    Operation(#[from] UnknownOperation),

    /// Event source error.
    #[error(transparent)]
    Hook(#[from] HookError),
}

/// A specialized Result type for keyhook-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ParseError::UnknownKey("foo".into()).to_string(),
            "unknown key name 'foo'"
        );
        assert_eq!(
            Error::from(UnknownOperation("Fly".into())).to_string(),
            "unknown operation 'Fly'"
        );
        assert_eq!(
            HookError::Unavailable("no display".into()).to_string(),
            "keyboard hook unavailable: no display"
        );
    }
}
