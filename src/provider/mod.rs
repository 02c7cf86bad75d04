//! Provider contract
//!
//! Defines the capability set every secret-store backend exposes to the
//! reconciliation controller: typed conversion of a store's generic payload,
//! static validation, referent namespace resolution, and client
//! construction. Implementations are stateless factories, registered once at
//! process start and alive for the process lifetime.

pub mod client;
pub mod fake;
pub mod gitlab;

pub use client::{SecretsClient, SecretString};
pub use fake::FakeProvider;
pub use gitlab::GitlabProvider;

use crate::domain::{GenericStore, ProviderKind, ProviderManifest, ReferentCallOrigin};
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Operations a backend supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreCapabilities {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl StoreCapabilities {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::WriteOnly => "write_only",
            Self::ReadWrite => "read_write",
        }
    }

    /// Whether read operations are supported
    pub fn can_read(&self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    /// Whether write operations are supported
    pub fn can_write(&self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

impl fmt::Display for StoreCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a backend session can currently be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    /// The client is configured correctly and can be used
    Ready,
    /// The client can be used but information is missing and it can not be
    /// validated
    Unknown,
    /// There is a misconfiguration
    Error,
}

impl ValidationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Unknown => "Unknown",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller handle a provider uses to resolve credential references.
///
/// The reconciliation controller supplies the implementation; providers only
/// ever read single keys through it. Tests use the in-memory reader from
/// [`fake`].
#[async_trait]
pub trait CredentialReader: Send + Sync {
    /// Read one key from a named credential object in a namespace
    async fn secret_key(&self, namespace: &str, name: &str, key: &str) -> Result<SecretString>;
}

/// A secret-store backend implementation.
///
/// Implementations must be `Send + Sync` for use in async contexts and must
/// not hold per-call state; one instance serves every store of its kind.
#[async_trait]
pub trait Provider: Send + Sync + fmt::Debug {
    /// The backend kind this provider serves
    fn kind(&self) -> ProviderKind;

    /// Static declaration of supported operations, used by the caller to
    /// reject unsupported requests before attempting them
    fn capabilities(&self) -> StoreCapabilities;

    /// Decode the store's generic provider payload into this backend's typed
    /// manifest.
    ///
    /// Fails with a conversion error naming the store when the payload does
    /// not match the backend's schema.
    fn convert(&self, store: &dyn GenericStore) -> Result<ProviderManifest>;

    /// Static, side-effect-free check of required fields and
    /// mutual-exclusion rules.
    ///
    /// Returns one error enumerating every violation found, not just the
    /// first.
    fn validate_store(&self, store: &dyn GenericStore) -> Result<()>;

    /// Rewrite credential-reference namespaces for a delegated resolution.
    ///
    /// For a namespace-scoped `origin` every credential reference in the
    /// returned manifest is pinned to `namespace`, discarding whatever the
    /// configuration author specified; a cluster-scoped origin leaves the
    /// manifest untouched. The input is never mutated, so one shared
    /// manifest can be resolved for many callers concurrently. A manifest
    /// that is not this backend's variant is rejected rather than returned
    /// unpinned.
    fn apply_referent(
        &self,
        manifest: &ProviderManifest,
        origin: ReferentCallOrigin,
        namespace: &str,
    ) -> Result<ProviderManifest>;

    /// Construct a live backend session scoped to `namespace`.
    ///
    /// Credential problems surface as authentication errors, a malformed
    /// manifest as a configuration error. Construction itself performs no
    /// network round-trip.
    async fn new_client(
        &self,
        manifest: &ProviderManifest,
        reader: Arc<dyn CredentialReader>,
        namespace: &str,
    ) -> Result<Box<dyn SecretsClient>>;
}
