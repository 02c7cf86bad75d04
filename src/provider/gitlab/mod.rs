//! GitLab secret-store backend
//!
//! Serves secrets from GitLab project and group CI/CD variables. The
//! provider is read-only: variables are fetched, never written.
//!
//! Referent resolution pins the access-token reference to the caller
//! namespace for namespace-scoped origins; only a cluster-scoped store may
//! keep an author-specified token namespace.

mod client;

pub use client::GitlabClient;

use crate::domain::{
    GenericStore, GitlabProviderSpec, ProviderKind, ProviderManifest, ProviderSpec,
    ReferentCallOrigin,
};
use crate::errors::{KeyplaneError, Result};
use crate::provider::{CredentialReader, Provider, SecretsClient, StoreCapabilities};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// GitLab secret-store provider
#[derive(Debug, Clone, Copy, Default)]
pub struct GitlabProvider;

impl GitlabProvider {
    /// Manifest kind name the provider registers under
    pub const KIND: &'static str = "Gitlab";

    pub fn new() -> Self {
        Self
    }

    /// Empty manifest prototype registered alongside the provider
    pub fn prototype() -> ProviderManifest {
        ProviderManifest {
            name: String::new(),
            namespace: None,
            spec: ProviderSpec::Gitlab(GitlabProviderSpec::default()),
        }
    }

    fn typed_spec<'a>(&self, manifest: &'a ProviderManifest) -> Result<&'a GitlabProviderSpec> {
        match &manifest.spec {
            ProviderSpec::Gitlab(spec) => Ok(spec),
            other => Err(KeyplaneError::conversion(
                &manifest.name,
                format!("expected a Gitlab manifest, got kind '{}'", other.kind().kind_name()),
            )),
        }
    }

    fn store_spec<'a>(&self, store: &'a dyn GenericStore) -> Result<&'a GitlabProviderSpec> {
        match &store.spec().provider {
            None => Err(KeyplaneError::empty_kind(store.name())),
            Some(ProviderSpec::Gitlab(spec)) => Ok(spec),
            Some(other) => Err(KeyplaneError::conversion(
                store.name(),
                format!("store declares provider kind '{}', not 'gitlab'", other.kind()),
            )),
        }
    }
}

#[async_trait]
impl Provider for GitlabProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gitlab
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::ReadOnly
    }

    fn convert(&self, store: &dyn GenericStore) -> Result<ProviderManifest> {
        let spec = self.store_spec(store)?;
        Ok(ProviderManifest {
            name: store.name().to_string(),
            namespace: store.namespace().map(str::to_string),
            spec: ProviderSpec::Gitlab(spec.clone()),
        })
    }

    fn validate_store(&self, store: &dyn GenericStore) -> Result<()> {
        let spec = self.store_spec(store)?;
        let token = &spec.auth.secret_ref.access_token;
        let mut violations = Vec::new();

        // Selector namespace rules follow the store's scope: a namespaced
        // store may not point outside itself, a cluster-scoped store must
        // say where the credential lives.
        match store.namespace() {
            Some(store_ns) => {
                if let Some(ref_ns) = token.namespace.as_deref() {
                    if ref_ns != store_ns {
                        violations.push(format!(
                            "accessToken.namespace '{}' must match the store namespace '{}' or be omitted",
                            ref_ns, store_ns
                        ));
                    }
                }
            }
            None => {
                if token.namespace.is_none() {
                    violations
                        .push("accessToken.namespace is required for a cluster-scoped store".to_string());
                }
            }
        }

        if spec.project_id.is_empty() && spec.group_ids.is_empty() {
            violations.push("projectID and groupIDs must not both be empty".to_string());
        }

        if spec.inherit_from_groups && !spec.group_ids.is_empty() {
            violations
                .push("defining groupIDs and inheritFromGroups = true is not allowed".to_string());
        }

        if token.name.is_empty() {
            violations.push("accessToken.name cannot be empty".to_string());
        }

        if token.key.is_empty() {
            violations.push("accessToken.key cannot be empty".to_string());
        }

        if !spec.url.is_empty() {
            if let Err(err) = Url::parse(&spec.url) {
                violations.push(format!("url '{}' is invalid: {}", spec.url, err));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(KeyplaneError::invalid_store(store.name(), violations))
        }
    }

    fn apply_referent(
        &self,
        manifest: &ProviderManifest,
        origin: ReferentCallOrigin,
        namespace: &str,
    ) -> Result<ProviderManifest> {
        let mut out = manifest.clone();
        let spec = match &mut out.spec {
            ProviderSpec::Gitlab(spec) => spec,
            // Resolution fails closed: a foreign manifest is rejected, never
            // passed through unpinned.
            other => {
                return Err(KeyplaneError::conversion(
                    &manifest.name,
                    format!("expected a Gitlab manifest, got kind '{}'", other.kind().kind_name()),
                ));
            }
        };

        if origin.pins_to_caller() {
            debug!(
                manifest = %manifest.name,
                origin = %origin,
                namespace,
                "Pinning access token reference to caller namespace"
            );
            spec.auth.secret_ref.access_token.namespace = Some(namespace.to_string());
        }

        Ok(out)
    }

    async fn new_client(
        &self,
        manifest: &ProviderManifest,
        reader: Arc<dyn CredentialReader>,
        namespace: &str,
    ) -> Result<Box<dyn SecretsClient>> {
        let spec = self.typed_spec(manifest)?;
        let selector = &spec.auth.secret_ref.access_token;
        if selector.name.is_empty() || selector.key.is_empty() {
            return Err(KeyplaneError::config(format!(
                "manifest '{}' carries no usable access token reference",
                manifest.name
            )));
        }

        let token_namespace = selector.namespace.as_deref().unwrap_or(namespace);
        let token = reader.secret_key(token_namespace, &selector.name, &selector.key).await?;
        if token.is_empty() {
            return Err(KeyplaneError::auth(format!(
                "access token '{}/{}' resolved to an empty value",
                token_namespace, selector.name
            )));
        }

        let client = GitlabClient::new(spec, token)?;
        Ok(Box::new(client))
    }
}
