//! # Keyplane
//!
//! Keyplane is the provider-dispatch core of a control plane for
//! declarative secret stores. It decides which backend implementation
//! serves a given store resource and whether a credential reference inside
//! that resource may be resolved against an arbitrary namespace or must be
//! pinned to the calling object's own namespace.
//!
//! ## Architecture
//!
//! ```text
//! Reconciliation Controller → Provider Schema → Provider → SecretsClient
//!         ↓                        ↓                ↓
//!   GenericStore objects    Kind registries   Referent resolution
//! ```
//!
//! ## Core Components
//!
//! - **Registry**: generic, thread-safe kind-to-implementation tables
//! - **Provider Schema**: lookup facade deriving registry keys from a store
//!   resource's declared provider block
//! - **Provider Contract**: conversion, validation, referent resolution,
//!   and client construction for each backend
//! - **Referent Resolver**: the namespace-pinning trust decision
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use keyplane::{ProviderSchema, ReferentCallOrigin, Result};
//!
//! fn resolve(schema: &ProviderSchema, store: &dyn keyplane::GenericStore) -> Result<()> {
//!     let provider = schema.provider_for_store(store)?;
//!     provider.validate_store(store)?;
//!     let manifest = provider.convert(store)?;
//!     let pinned = provider.apply_referent(&manifest, ReferentCallOrigin::SecretStore, "ns-a")?;
//!     let _ = pinned;
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod errors;
pub mod observability;
pub mod provider;
pub mod registry;
pub mod schema;

// Re-export commonly used types and traits
pub use domain::{
    ClusterSecretStore, GenericStore, ProviderKind, ProviderManifest, ProviderSpec,
    ReferentCallOrigin, SecretKeySelector, SecretStore, StoreSpec,
};
pub use errors::{KeyplaneError, Result};
pub use observability::{init_tracing, ObservabilityConfig};
pub use provider::{
    CredentialReader, Provider, SecretsClient, SecretString, StoreCapabilities, ValidationResult,
};
pub use registry::Registry;
pub use schema::{ProviderRegistration, ProviderSchema, SchemaBuilder};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
