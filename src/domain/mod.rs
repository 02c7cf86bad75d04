//! Domain types for declarative secret stores.
//!
//! Contains the store resources handed to the core by its caller, the typed
//! provider payloads, and the referent call origin used for namespace-pinning
//! decisions.

pub mod referent;
pub mod store;

pub use referent::ReferentCallOrigin;
pub use store::{
    ClusterSecretStore, FakeProviderSpec, GenericStore, GitlabAuth, GitlabProviderSpec,
    GitlabSecretRef, ProviderKind, ProviderManifest, ProviderSpec, SecretKeySelector, SecretStore,
    StoreSpec,
};
