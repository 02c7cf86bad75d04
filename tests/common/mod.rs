//! Common test utilities for all integration tests.

#![allow(dead_code)]

use keyplane::domain::{
    FakeProviderSpec, GitlabAuth, GitlabProviderSpec, GitlabSecretRef, ProviderManifest,
    ProviderSpec, SecretKeySelector,
};
use keyplane::{ClusterSecretStore, SecretStore, StoreSpec};
use std::collections::BTreeMap;

/// GitLab spec pointing at `url` with an access token reference in
/// `token_namespace`.
pub fn gitlab_spec(url: &str, token_namespace: Option<&str>) -> GitlabProviderSpec {
    GitlabProviderSpec {
        url: url.to_string(),
        auth: GitlabAuth {
            secret_ref: GitlabSecretRef {
                access_token: SecretKeySelector {
                    name: "gitlab-token".to_string(),
                    namespace: token_namespace.map(str::to_string),
                    key: "token".to_string(),
                },
            },
        },
        project_id: "42".to_string(),
        ..Default::default()
    }
}

/// Namespaced store in `namespace` wrapping `spec`.
pub fn gitlab_store(namespace: &str, spec: GitlabProviderSpec) -> SecretStore {
    SecretStore {
        name: "gitlab-store".to_string(),
        namespace: namespace.to_string(),
        spec: StoreSpec { provider: Some(ProviderSpec::Gitlab(spec)) },
    }
}

/// Cluster-scoped store wrapping `spec`.
pub fn cluster_gitlab_store(spec: GitlabProviderSpec) -> ClusterSecretStore {
    ClusterSecretStore {
        name: "org-gitlab".to_string(),
        spec: StoreSpec { provider: Some(ProviderSpec::Gitlab(spec)) },
    }
}

/// Typed GitLab manifest as `convert` would produce it.
pub fn gitlab_manifest(namespace: &str, spec: GitlabProviderSpec) -> ProviderManifest {
    ProviderManifest {
        name: "gitlab-store".to_string(),
        namespace: Some(namespace.to_string()),
        spec: ProviderSpec::Gitlab(spec),
    }
}

/// Namespaced fake store serving `data`.
pub fn fake_store(namespace: &str, data: &[(&str, &str)]) -> SecretStore {
    let data: BTreeMap<String, String> =
        data.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    SecretStore {
        name: "fake-store".to_string(),
        namespace: namespace.to_string(),
        spec: StoreSpec { provider: Some(ProviderSpec::Fake(FakeProviderSpec { data })) },
    }
}
