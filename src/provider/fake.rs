//! Deterministic in-memory backend
//!
//! Serves a fixed key/value map declared directly in the store spec. Used by
//! test harnesses (usually through `force_register`) and for local
//! development without an external store.

use crate::domain::{
    FakeProviderSpec, GenericStore, ProviderKind, ProviderManifest, ProviderSpec,
    ReferentCallOrigin,
};
use crate::errors::{KeyplaneError, Result};
use crate::provider::client::{SecretString, SecretsClient};
use crate::provider::{CredentialReader, Provider, StoreCapabilities, ValidationResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// In-memory secret-store provider
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeProvider;

impl FakeProvider {
    /// Manifest kind name the provider registers under
    pub const KIND: &'static str = "Fake";

    pub fn new() -> Self {
        Self
    }

    /// Empty manifest prototype registered alongside the provider
    pub fn prototype() -> ProviderManifest {
        ProviderManifest {
            name: String::new(),
            namespace: None,
            spec: ProviderSpec::Fake(FakeProviderSpec::default()),
        }
    }

    fn store_spec<'a>(&self, store: &'a dyn GenericStore) -> Result<&'a FakeProviderSpec> {
        match &store.spec().provider {
            None => Err(KeyplaneError::empty_kind(store.name())),
            Some(ProviderSpec::Fake(spec)) => Ok(spec),
            Some(other) => Err(KeyplaneError::conversion(
                store.name(),
                format!("store declares provider kind '{}', not 'fake'", other.kind()),
            )),
        }
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fake
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::ReadWrite
    }

    fn convert(&self, store: &dyn GenericStore) -> Result<ProviderManifest> {
        let spec = self.store_spec(store)?;
        Ok(ProviderManifest {
            name: store.name().to_string(),
            namespace: store.namespace().map(str::to_string),
            spec: ProviderSpec::Fake(spec.clone()),
        })
    }

    fn validate_store(&self, store: &dyn GenericStore) -> Result<()> {
        let spec = self.store_spec(store)?;
        let mut violations = Vec::new();

        if spec.data.is_empty() {
            violations.push("data must not be empty".to_string());
        }
        if spec.data.keys().any(|key| key.is_empty()) {
            violations.push("data keys cannot be empty".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(KeyplaneError::invalid_store(store.name(), violations))
        }
    }

    /// The payload carries no credential references, so there is nothing to
    /// pin; every origin gets an identical copy. A foreign manifest is still
    /// rejected.
    fn apply_referent(
        &self,
        manifest: &ProviderManifest,
        _origin: ReferentCallOrigin,
        _namespace: &str,
    ) -> Result<ProviderManifest> {
        match &manifest.spec {
            ProviderSpec::Fake(_) => Ok(manifest.clone()),
            other => Err(KeyplaneError::conversion(
                &manifest.name,
                format!("expected a Fake manifest, got kind '{}'", other.kind().kind_name()),
            )),
        }
    }

    async fn new_client(
        &self,
        manifest: &ProviderManifest,
        _reader: Arc<dyn CredentialReader>,
        _namespace: &str,
    ) -> Result<Box<dyn SecretsClient>> {
        let spec = match &manifest.spec {
            ProviderSpec::Fake(spec) => spec,
            other => {
                return Err(KeyplaneError::config(format!(
                    "manifest '{}' carries kind '{}', not 'Fake'",
                    manifest.name,
                    other.kind().kind_name()
                )));
            }
        };
        Ok(Box::new(FakeClient::new(&spec.data)))
    }
}

/// In-memory read-write session
#[derive(Debug, Default)]
pub struct FakeClient {
    data: RwLock<BTreeMap<String, String>>,
}

impl FakeClient {
    pub fn new(data: &BTreeMap<String, String>) -> Self {
        Self { data: RwLock::new(data.clone()) }
    }
}

#[async_trait]
impl SecretsClient for FakeClient {
    async fn get_secret(&self, key: &str) -> Result<SecretString> {
        let data = self
            .data
            .read()
            .map_err(|_| KeyplaneError::internal("fake client lock poisoned"))?;
        data.get(key).map(SecretString::new).ok_or_else(|| KeyplaneError::not_found(key))
    }

    async fn get_secret_map(&self) -> Result<BTreeMap<String, SecretString>> {
        let data = self
            .data
            .read()
            .map_err(|_| KeyplaneError::internal("fake client lock poisoned"))?;
        Ok(data.iter().map(|(key, value)| (key.clone(), SecretString::new(value))).collect())
    }

    async fn set_secret(&self, key: &str, value: SecretString) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| KeyplaneError::internal("fake client lock poisoned"))?;
        data.insert(key.to_string(), value.expose_secret().to_string());
        Ok(())
    }

    fn validate(&self) -> ValidationResult {
        ValidationResult::Ready
    }
}

/// Fixed-map credential reader for tests and local development.
///
/// Keys are `(namespace, name, key)` triples; anything absent reads as
/// not-found, the same surface a live cluster reader presents.
#[derive(Debug, Default)]
pub struct StaticCredentialReader {
    entries: HashMap<(String, String, String), String>,
}

impl StaticCredentialReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one credential key
    pub fn insert(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.entries.insert((namespace.into(), name.into(), key.into()), value.into());
        self
    }
}

#[async_trait]
impl CredentialReader for StaticCredentialReader {
    async fn secret_key(&self, namespace: &str, name: &str, key: &str) -> Result<SecretString> {
        self.entries
            .get(&(namespace.to_string(), name.to_string(), key.to_string()))
            .map(SecretString::new)
            .ok_or_else(|| KeyplaneError::not_found(format!("{}/{}#{}", namespace, name, key)))
    }
}
