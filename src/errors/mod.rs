//! # Error Handling
//!
//! Error types for the keyplane provider core, defined with `thiserror`.
//!
//! Three broad classes of failure exist:
//! - startup invariant violations (duplicate registrations), surfaced as
//!   errors and aggregated by the schema builder for the process entry point,
//! - recoverable per-store failures (lookup, conversion, validation), which
//!   the reconciliation controller reports against the offending resource,
//! - credential and configuration failures raised while constructing a
//!   backend session.

/// Custom result type for keyplane operations
pub type Result<T> = std::result::Result<T, KeyplaneError>;

/// Main error type for the keyplane provider core
#[derive(thiserror::Error, Debug)]
pub enum KeyplaneError {
    /// A provider kind was registered twice in the same registry.
    #[error("provider kind '{kind}' is already registered")]
    AlreadyRegistered { kind: String },

    /// No provider is registered for the requested kind.
    #[error("no registered store backend for kind '{kind}'")]
    NotRegistered { kind: String },

    /// A store object carries no provider declaration to derive a kind from.
    #[error("store '{store}' declares no provider")]
    EmptyKind { store: String },

    /// A generic provider payload did not match the backend's typed schema.
    #[error("could not convert store '{store}': {reason}")]
    Conversion { store: String, reason: String },

    /// Static store validation failed. Carries every violation found, not
    /// just the first, so the caller can report a complete remediation list.
    #[error("store '{store}' failed validation: {}", .violations.join("; "))]
    InvalidStore { store: String, violations: Vec<String> },

    /// A secret the backend session was asked for does not exist.
    #[error("secret not found: {key}")]
    NotFound { key: String },

    /// The external backend rejected or failed a session operation.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// Credential problems while constructing a backend session.
    #[error("authentication error: {message}")]
    Auth { message: String },

    /// Malformed configuration handed to a backend.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Internal errors (poisoned locks and other invariant breakage).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl KeyplaneError {
    /// Create a duplicate-registration error
    pub fn already_registered(kind: impl Into<String>) -> Self {
        Self::AlreadyRegistered { kind: kind.into() }
    }

    /// Create a not-registered lookup error
    pub fn not_registered(kind: impl Into<String>) -> Self {
        Self::NotRegistered { kind: kind.into() }
    }

    /// Create an empty-kind lookup error
    pub fn empty_kind(store: impl Into<String>) -> Self {
        Self::EmptyKind { store: store.into() }
    }

    /// Create a conversion error naming the offending store
    pub fn conversion(store: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Conversion { store: store.into(), reason: reason.into() }
    }

    /// Create an aggregate validation error from the violations found
    pub fn invalid_store(store: impl Into<String>, violations: Vec<String>) -> Self {
        Self::InvalidStore { store: store.into(), violations }
    }

    /// Create a not-found error
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }

    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth { message: message.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}
