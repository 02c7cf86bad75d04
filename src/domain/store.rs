//! Secret store resource types
//!
//! This module contains the declarative resources the provider core
//! dispatches on: namespaced [`SecretStore`] and cluster-scoped
//! [`ClusterSecretStore`] objects, the per-backend provider payloads, and the
//! typed [`ProviderManifest`] produced by conversion.
//!
//! Store objects are owned by the caller and read-only to the core.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Declared kind of the namespaced store resource.
pub const SECRET_STORE_KIND: &str = "SecretStore";

/// Declared kind of the cluster-scoped store resource.
pub const CLUSTER_SECRET_STORE_KIND: &str = "ClusterSecretStore";

/// Backend kind enumeration, one value per compiled-in provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// GitLab project/group CI variables
    Gitlab,
    /// Deterministic in-memory backend for tests and local development
    Fake,
}

impl ProviderKind {
    /// Get the wire representation of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gitlab => "gitlab",
            Self::Fake => "fake",
        }
    }

    /// The manifest kind name this backend registers under
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Gitlab => "Gitlab",
            Self::Fake => "Fake",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gitlab" => Ok(Self::Gitlab),
            "fake" => Ok(Self::Fake),
            _ => Err(format!("Unknown provider kind: {}", s)),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to a key inside a credential object in some namespace.
///
/// The `namespace` is what referent resolution rewrites: a namespace-scoped
/// caller never gets to keep an author-specified value here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    /// Name of the credential object
    pub name: String,
    /// Namespace the credential lives in; empty means "the store's own"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Key within the credential object
    pub key: String,
}

/// GitLab access-token reference block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitlabSecretRef {
    /// Personal or project access token used against the variables API
    pub access_token: SecretKeySelector,
}

/// GitLab authentication block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitlabAuth {
    pub secret_ref: GitlabSecretRef,
}

/// GitLab backend configuration payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitlabProviderSpec {
    /// Base URL of the GitLab instance; empty means gitlab.com
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Credentials used against the variables API
    #[serde(default)]
    pub auth: GitlabAuth,
    /// Project whose variables are read
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    /// Groups whose variables are read
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_ids: Vec<String>,
    /// Walk the project's ancestor groups instead of listing them explicitly
    #[serde(default)]
    pub inherit_from_groups: bool,
    /// Restrict variable lookups to one environment scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// In-memory backend payload, for tests and local development
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FakeProviderSpec {
    /// Fixed key/value data served by the backend
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Backend-specific provider payload of a store resource.
///
/// Exactly one backend is declared per store; the enum tag is the registry
/// key, so dispatch never inspects types at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSpec {
    Gitlab(GitlabProviderSpec),
    Fake(FakeProviderSpec),
}

impl ProviderSpec {
    /// The backend kind this payload declares
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Gitlab(_) => ProviderKind::Gitlab,
            Self::Fake(_) => ProviderKind::Fake,
        }
    }
}

/// Typed provider object produced by [`Provider::convert`] and consumed by
/// referent resolution and client construction.
///
/// [`Provider::convert`]: crate::provider::Provider::convert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderManifest {
    /// Name of the store resource the manifest was derived from
    pub name: String,
    /// Namespace of that resource; `None` for cluster-scoped stores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Typed backend payload
    pub spec: ProviderSpec,
}

impl ProviderManifest {
    /// The backend kind of the manifest
    pub fn provider_kind(&self) -> ProviderKind {
        self.spec.kind()
    }

    /// The manifest kind name, e.g. `"Gitlab"`
    pub fn kind(&self) -> &'static str {
        self.spec.kind().kind_name()
    }
}

/// Specification of a store resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSpec {
    /// Declared backend payload; a store without one cannot be dispatched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderSpec>,
}

/// A declarative store resource as seen by the provider core.
///
/// Implemented by [`SecretStore`] and [`ClusterSecretStore`]; the core never
/// mutates an object behind this trait.
pub trait GenericStore: Send + Sync {
    /// Declared resource kind
    fn kind(&self) -> &'static str;

    /// Resource name
    fn name(&self) -> &str;

    /// Resource namespace; `None` for cluster-scoped resources
    fn namespace(&self) -> Option<&str>;

    /// Resource specification
    fn spec(&self) -> &StoreSpec;

    /// Whether the resource is cluster-scoped
    fn is_cluster_scoped(&self) -> bool {
        self.namespace().is_none()
    }
}

/// Namespaced secret store resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretStore {
    pub name: String,
    pub namespace: String,
    pub spec: StoreSpec,
}

impl GenericStore for SecretStore {
    fn kind(&self) -> &'static str {
        SECRET_STORE_KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> Option<&str> {
        Some(&self.namespace)
    }

    fn spec(&self) -> &StoreSpec {
        &self.spec
    }
}

/// Cluster-scoped secret store resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSecretStore {
    pub name: String,
    pub spec: StoreSpec,
}

impl GenericStore for ClusterSecretStore {
    fn kind(&self) -> &'static str {
        CLUSTER_SECRET_STORE_KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> Option<&str> {
        None
    }

    fn spec(&self) -> &StoreSpec {
        &self.spec
    }
}
