//! Provider schema: the lookup facade over the three kind registries
//!
//! One [`ProviderSchema`] value holds every registered backend for the
//! process. It is constructed once at startup (normally through
//! [`ProviderSchema::with_builtin_providers`]) and injected into the
//! referent resolver and the reconciliation controller; there is no global
//! mutable registry state.
//!
//! A backend registers under three keys with one call: its store type, its
//! manifest kind name, and a manifest prototype for that kind. Duplicate
//! kinds are build-time misconfigurations; the builder aggregates every
//! violation into a single error so the process entry point can report them
//! all and abort.

use crate::domain::{GenericStore, ProviderKind, ProviderManifest};
use crate::errors::{KeyplaneError, Result};
use crate::provider::{FakeProvider, GitlabProvider, Provider};
use crate::registry::Registry;
use std::sync::Arc;
use tracing::info;

/// Everything one backend registers: the provider, its store type, its
/// manifest kind name, and the manifest prototype for that kind.
#[derive(Debug, Clone)]
pub struct ProviderRegistration {
    pub store_type: ProviderKind,
    pub kind: &'static str,
    pub provider: Arc<dyn Provider>,
    pub prototype: ProviderManifest,
}

impl ProviderRegistration {
    /// Registration for the GitLab backend
    pub fn gitlab() -> Self {
        Self {
            store_type: ProviderKind::Gitlab,
            kind: GitlabProvider::KIND,
            provider: Arc::new(GitlabProvider::new()),
            prototype: GitlabProvider::prototype(),
        }
    }

    /// Registration for the in-memory backend
    pub fn fake() -> Self {
        Self {
            store_type: ProviderKind::Fake,
            kind: FakeProvider::KIND,
            provider: Arc::new(FakeProvider::new()),
            prototype: FakeProvider::prototype(),
        }
    }
}

/// Registry facade dispatching store resources to providers
#[derive(Debug, Default)]
pub struct ProviderSchema {
    /// Provider keyed by the store type a resource declares
    providers: Registry<ProviderKind, Arc<dyn Provider>>,
    /// Provider keyed by manifest kind name
    providers_by_kind: Registry<String, Arc<dyn Provider>>,
    /// Manifest prototype keyed by manifest kind name
    manifests: Registry<String, ProviderManifest>,
}

impl ProviderSchema {
    /// Create a schema with no registered backends
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema with every compiled-in backend registered.
    ///
    /// This is the normal startup path; a duplicate kind among the builtin
    /// backends aborts startup through the aggregated builder error.
    pub fn with_builtin_providers() -> Result<Self> {
        SchemaBuilder::new()
            .with(ProviderRegistration::gitlab())
            .with(ProviderRegistration::fake())
            .build()
    }

    /// Start building a schema from explicit registrations
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Register one backend under all three keys.
    ///
    /// Fails without touching any registry if any key is already taken.
    pub fn register(&self, registration: ProviderRegistration) -> Result<()> {
        if self.providers.contains(&registration.store_type) {
            return Err(KeyplaneError::already_registered(registration.store_type.to_string()));
        }
        if self.providers_by_kind.contains(&registration.kind.to_string())
            || self.manifests.contains(&registration.kind.to_string())
        {
            return Err(KeyplaneError::already_registered(registration.kind));
        }

        info!(
            store_type = %registration.store_type,
            kind = registration.kind,
            capabilities = %registration.provider.capabilities(),
            "Registering secret store provider"
        );
        self.providers.register(registration.store_type, registration.provider.clone())?;
        self.providers_by_kind.register(registration.kind.to_string(), registration.provider)?;
        self.manifests.register(registration.kind.to_string(), registration.prototype)?;
        Ok(())
    }

    /// Register one backend, overwriting any existing entries.
    ///
    /// Reserved for test harnesses, never used in normal startup paths.
    pub fn force_register(&self, registration: ProviderRegistration) {
        info!(
            store_type = %registration.store_type,
            kind = registration.kind,
            "Force-registering secret store provider"
        );
        self.providers.force_register(registration.store_type, registration.provider.clone());
        self.providers_by_kind
            .force_register(registration.kind.to_string(), registration.provider);
        self.manifests.force_register(registration.kind.to_string(), registration.prototype);
    }

    /// Look up the provider for a store type
    pub fn provider_for_store_type(&self, store_type: ProviderKind) -> Option<Arc<dyn Provider>> {
        self.providers.lookup(&store_type)
    }

    /// Look up the provider for a manifest kind name
    pub fn provider_for_kind(&self, kind: &str) -> Option<Arc<dyn Provider>> {
        self.providers_by_kind.lookup(&kind.to_string())
    }

    /// Look up the provider for a store object from its declared provider
    /// block.
    ///
    /// Fails with `EmptyKind` when the store declares no provider and
    /// `NotRegistered` when no backend serves the declared kind.
    pub fn provider_for_store(&self, store: &dyn GenericStore) -> Result<Arc<dyn Provider>> {
        let spec = store
            .spec()
            .provider
            .as_ref()
            .ok_or_else(|| KeyplaneError::empty_kind(store.name()))?;
        let store_type = spec.kind();
        self.providers
            .lookup(&store_type)
            .ok_or_else(|| KeyplaneError::not_registered(store_type.to_string()))
    }

    /// Clone of the manifest prototype registered for a kind name
    pub fn manifest_for_kind(&self, kind: &str) -> Result<ProviderManifest> {
        self.manifests
            .lookup(&kind.to_string())
            .ok_or_else(|| KeyplaneError::not_registered(kind))
    }

    /// Store types with a registered provider
    pub fn registered_store_types(&self) -> Vec<ProviderKind> {
        self.providers.registered_kinds()
    }
}

/// Collects registrations and reports every duplicate at once.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    registrations: Vec<ProviderRegistration>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one backend registration
    pub fn with(mut self, registration: ProviderRegistration) -> Self {
        self.registrations.push(registration);
        self
    }

    /// Build the schema.
    ///
    /// Every duplicate kind across the collected registrations is gathered
    /// into one configuration error; the entry point decides whether to
    /// abort (it should).
    pub fn build(self) -> Result<ProviderSchema> {
        let schema = ProviderSchema::new();
        let mut duplicates = Vec::new();

        for registration in self.registrations {
            if let Err(err) = schema.register(registration) {
                duplicates.push(err.to_string());
            }
        }

        if duplicates.is_empty() {
            Ok(schema)
        } else {
            Err(KeyplaneError::config(format!(
                "duplicate provider registrations: {}",
                duplicates.join("; ")
            )))
        }
    }
}
