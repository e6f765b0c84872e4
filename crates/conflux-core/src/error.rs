//! Error types for conflux-core.

use thiserror::Error;

/// Result type alias for Conflux operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing and serving MCP objects.
///
/// Registration-time errors (duplicates, invalid prefixes, mount cycles)
/// abort the mutating call entirely, leaving prior state unchanged.
/// Execution-time errors are per-call and never corrupt manager state.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// An item with this key is already registered.
    #[error("{kind} already exists: {key}")]
    Duplicate {
        /// Item kind ("tool", "resource", "prompt").
        kind: &'static str,
        /// The colliding registration key.
        key: String,
    },

    /// Lookup miss on get/call/read.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Item kind.
        kind: &'static str,
        /// The key that was requested.
        key: String,
    },

    /// A mount/import prefix was rejected before any state changed.
    #[error("invalid prefix {prefix:?}: {reason}")]
    InvalidPrefix {
        /// The offending prefix.
        prefix: String,
        /// Why it was rejected (separator character, empty, or a
        /// resource-prefix-format mismatch between composition partners).
        reason: String,
    },

    /// Mounting would make a server reachable from itself.
    #[error("mount cycle detected: server '{server}' would be reachable from itself")]
    MountCycle {
        /// Name of the server whose mount was rejected.
        server: String,
    },

    /// A registered callable failed; annotated with the item's name so
    /// callers get a uniform failure shape.
    #[error("{kind} '{name}' failed: {source}")]
    Execution {
        /// Item kind.
        kind: &'static str,
        /// Name or URI of the failing item.
        name: String,
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A URL could not be parsed or used for transport resolution.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// What configuration is problematic.
        message: String,
    },
}

impl Error {
    /// Creates a duplicate-registration error.
    pub fn duplicate(kind: &'static str, key: impl Into<String>) -> Self {
        Error::Duplicate {
            kind,
            key: key.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Creates an invalid-prefix error.
    pub fn invalid_prefix(prefix: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPrefix {
            prefix: prefix.into(),
            reason: reason.into(),
        }
    }

    /// Creates an execution error wrapping the cause of a failed callable.
    pub fn execution<E>(kind: &'static str, name: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Execution {
            kind,
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Creates an execution error from a plain message.
    pub fn execution_msg(kind: &'static str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Execution {
            kind,
            name: name.into(),
            source: message.into().into(),
        }
    }

    /// Creates an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns whether this is a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns whether this error occurred while registering/mounting
    /// (as opposed to while executing a callable).
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Error::Duplicate { .. } | Error::InvalidPrefix { .. } | Error::MountCycle { .. }
        )
    }
}
