//! Referent namespace pinning, exercised through the full dispatch flow:
//! schema lookup, validation, conversion, then referent resolution.

mod common;

use common::{cluster_gitlab_store, gitlab_manifest, gitlab_spec, gitlab_store};
use keyplane::domain::ProviderSpec;
use keyplane::{KeyplaneError, ProviderSchema, ReferentCallOrigin};
use proptest::prelude::*;

fn token_namespace(manifest: &keyplane::ProviderManifest) -> Option<&str> {
    match &manifest.spec {
        ProviderSpec::Gitlab(spec) => spec.auth.secret_ref.access_token.namespace.as_deref(),
        other => panic!("unexpected spec {:?}", other),
    }
}

#[test]
fn test_namespaced_origin_discards_the_author_namespace() {
    let schema = ProviderSchema::with_builtin_providers().unwrap();
    let store = cluster_gitlab_store(gitlab_spec("https://gitlab.example.com", Some("ns-b")));

    let provider = schema.provider_for_store(&store).unwrap();
    provider.validate_store(&store).unwrap();
    let manifest = provider.convert(&store).unwrap();

    let pinned =
        provider.apply_referent(&manifest, ReferentCallOrigin::SecretStore, "ns-a").unwrap();
    assert_eq!(token_namespace(&pinned), Some("ns-a"));

    let pinned = provider.apply_referent(&manifest, ReferentCallOrigin::Provider, "ns-a").unwrap();
    assert_eq!(token_namespace(&pinned), Some("ns-a"));
}

#[test]
fn test_cluster_origin_keeps_the_author_namespace() {
    let schema = ProviderSchema::with_builtin_providers().unwrap();
    let store = cluster_gitlab_store(gitlab_spec("https://gitlab.example.com", Some("ns-b")));

    let provider = schema.provider_for_store(&store).unwrap();
    let manifest = provider.convert(&store).unwrap();

    let resolved = provider
        .apply_referent(&manifest, ReferentCallOrigin::ClusterSecretStore, "ns-a")
        .unwrap();
    assert_eq!(token_namespace(&resolved), Some("ns-b"));
    assert_eq!(resolved, manifest);
}

#[test]
fn test_resolution_never_mutates_the_shared_input() {
    let schema = ProviderSchema::with_builtin_providers().unwrap();
    let manifest = gitlab_manifest("ns-a", gitlab_spec("https://gitlab.example.com", Some("ns-b")));
    let before = manifest.clone();

    let provider = schema.provider_for_kind("Gitlab").unwrap();
    let for_a = provider.apply_referent(&manifest, ReferentCallOrigin::SecretStore, "ns-a").unwrap();
    let for_c = provider.apply_referent(&manifest, ReferentCallOrigin::SecretStore, "ns-c").unwrap();

    // Two callers, two independent outputs, untouched input.
    assert_eq!(manifest, before);
    assert_eq!(token_namespace(&for_a), Some("ns-a"));
    assert_eq!(token_namespace(&for_c), Some("ns-c"));
}

#[test]
fn test_resolution_fails_closed_on_a_foreign_manifest() {
    let schema = ProviderSchema::with_builtin_providers().unwrap();
    let provider = schema.provider_for_kind("Gitlab").unwrap();
    let manifest = schema.manifest_for_kind("Fake").unwrap();

    let err = provider
        .apply_referent(&manifest, ReferentCallOrigin::SecretStore, "ns-a")
        .expect_err("must reject, not pass through unpinned");
    assert!(matches!(err, KeyplaneError::Conversion { .. }));
}

#[test]
fn test_validation_aggregates_the_gitlab_rules() {
    let schema = ProviderSchema::with_builtin_providers().unwrap();
    let provider = schema.provider_for_kind("Gitlab").unwrap();

    // Neither projectID nor groupIDs set.
    let mut spec = gitlab_spec("https://gitlab.example.com", None);
    spec.project_id.clear();
    let err = provider.validate_store(&gitlab_store("ns-a", spec)).unwrap_err();
    assert!(err.to_string().contains("projectID and groupIDs must not both be empty"));

    // inheritFromGroups together with explicit groupIDs.
    let mut spec = gitlab_spec("https://gitlab.example.com", None);
    spec.group_ids = vec!["7".to_string()];
    spec.inherit_from_groups = true;
    let err = provider.validate_store(&gitlab_store("ns-a", spec)).unwrap_err();
    assert!(err.to_string().contains("inheritFromGroups"));

    // Several violations surface together.
    let mut spec = gitlab_spec("https://gitlab.example.com", None);
    spec.project_id.clear();
    spec.auth.secret_ref.access_token.key.clear();
    match provider.validate_store(&gitlab_store("ns-a", spec)).unwrap_err() {
        KeyplaneError::InvalidStore { violations, .. } => assert_eq!(violations.len(), 2),
        other => panic!("expected InvalidStore, got {:?}", other),
    }

    // A complete spec passes.
    let spec = gitlab_spec("https://gitlab.example.com", None);
    provider.validate_store(&gitlab_store("ns-a", spec)).unwrap();
}

proptest! {
    /// Pinning origins force the caller namespace no matter what the author
    /// wrote; the cluster origin preserves it; and resolution is
    /// deterministic for any (origin, namespace) pair.
    #[test]
    fn test_referent_resolution_properties(
        caller_ns in "[a-z][a-z0-9-]{0,14}",
        author_ns in "[a-z][a-z0-9-]{0,14}",
        origin in prop_oneof![
            Just(ReferentCallOrigin::SecretStore),
            Just(ReferentCallOrigin::ClusterSecretStore),
            Just(ReferentCallOrigin::Provider),
        ],
    ) {
        let schema = ProviderSchema::with_builtin_providers().unwrap();
        let provider = schema.provider_for_kind("Gitlab").unwrap();
        let manifest = gitlab_manifest(
            "ns-a",
            gitlab_spec("https://gitlab.example.com", Some(author_ns.as_str())),
        );

        let first = provider.apply_referent(&manifest, origin, &caller_ns).unwrap();
        let second = provider.apply_referent(&manifest, origin, &caller_ns).unwrap();
        prop_assert_eq!(&first, &second);

        let expected = if origin.pins_to_caller() { caller_ns.as_str() } else { author_ns.as_str() };
        prop_assert_eq!(token_namespace(&first), Some(expected));
    }
}
