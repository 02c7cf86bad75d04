//! Referent call origin
//!
//! When a store configuration is resolved on behalf of another object, the
//! scope of that object decides whether credential references may target an
//! arbitrary namespace. A namespace-scoped caller can only authorize access
//! to credentials in its own namespace; honoring an author-specified
//! namespace there would let a store read another tenant's secrets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scope of the object that triggered referent resolution.
///
/// Passed per-call, never persisted. The enum is closed: an origin string
/// that does not name one of these values fails to parse rather than
/// defaulting, so an unrecognized origin can never reach the pinning
/// decision as an implicitly trusted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferentCallOrigin {
    /// A namespaced store resource
    SecretStore,
    /// A cluster-scoped store resource
    ClusterSecretStore,
    /// A namespaced standalone provider manifest
    Provider,
}

impl ReferentCallOrigin {
    /// Whether credential references must be pinned to the caller namespace.
    ///
    /// Namespace-scoped origins pin; a cluster-scoped store is
    /// administrator-controlled and may reference any namespace. The match
    /// is exhaustive, so every origin maps to a defined action.
    pub fn pins_to_caller(&self) -> bool {
        match self {
            Self::SecretStore | Self::Provider => true,
            Self::ClusterSecretStore => false,
        }
    }

    /// Get the wire representation of this origin
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecretStore => "SecretStore",
            Self::ClusterSecretStore => "ClusterSecretStore",
            Self::Provider => "Provider",
        }
    }
}

impl FromStr for ReferentCallOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SecretStore" => Ok(Self::SecretStore),
            "ClusterSecretStore" => Ok(Self::ClusterSecretStore),
            "Provider" => Ok(Self::Provider),
            _ => Err(format!("Unknown referent call origin: {}", s)),
        }
    }
}

impl fmt::Display for ReferentCallOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
