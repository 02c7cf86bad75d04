//! GitLab backend sessions against a mocked variables API.

mod common;

use common::{gitlab_manifest, gitlab_spec};
use keyplane::provider::fake::StaticCredentialReader;
use keyplane::{KeyplaneError, ProviderSchema, SecretsClient, ValidationResult};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn variable_body(key: &str, value: &str, scope: &str) -> serde_json::Value {
    serde_json::json!({ "key": key, "value": value, "environment_scope": scope })
}

async fn client_for(
    server: &MockServer,
    configure: impl FnOnce(&mut keyplane::domain::GitlabProviderSpec),
) -> Box<dyn SecretsClient> {
    let mut spec = gitlab_spec(&server.uri(), None);
    configure(&mut spec);
    let manifest = gitlab_manifest("ns-a", spec);

    let reader =
        Arc::new(StaticCredentialReader::new().insert("ns-a", "gitlab-token", "token", "glpat-test"));
    let schema = ProviderSchema::with_builtin_providers().unwrap();
    let provider = schema.provider_for_kind("Gitlab").unwrap();
    provider.new_client(&manifest, reader, "ns-a").await.unwrap()
}

#[tokio::test]
async fn test_fetches_a_project_variable_with_the_resolved_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/variables/DB_PASSWORD"))
        .and(header("PRIVATE-TOKEN", "glpat-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(variable_body("DB_PASSWORD", "s3cr3t", "*")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, |_| {}).await;
    let secret = client.get_secret("DB_PASSWORD").await.unwrap();
    assert_eq!(secret.expose_secret(), "s3cr3t");
    assert_eq!(client.validate(), ValidationResult::Ready);
}

#[tokio::test]
async fn test_falls_back_to_group_variables_when_the_project_misses() {
    let server = MockServer::start().await;
    // Project lookup 404s (wiremock default for unmatched paths), group hits.
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/7/variables/DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(variable_body("DB_PASSWORD", "from-group", "*")))
        .mount(&server)
        .await;

    let client = client_for(&server, |spec| {
        spec.group_ids = vec!["7".to_string()];
    })
    .await;

    let secret = client.get_secret("DB_PASSWORD").await.unwrap();
    assert_eq!(secret.expose_secret(), "from-group");
}

#[tokio::test]
async fn test_missing_everywhere_is_not_found() {
    let server = MockServer::start().await;

    let client = client_for(&server, |spec| {
        spec.group_ids = vec!["7".to_string()];
    })
    .await;

    let err = client.get_secret("NOPE").await.unwrap_err();
    assert!(matches!(err, KeyplaneError::NotFound { .. }));
}

#[tokio::test]
async fn test_rejected_token_surfaces_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/variables/DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server, |_| {}).await;
    let err = client.get_secret("DB_PASSWORD").await.unwrap_err();
    assert!(matches!(err, KeyplaneError::Auth { .. }));
}

#[tokio::test]
async fn test_environment_scope_filters_variables() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/variables/DB_PASSWORD"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(variable_body("DB_PASSWORD", "staged", "staging")),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, |spec| {
        spec.environment = Some("production".to_string());
    })
    .await;

    // The variable exists but is scoped to another environment.
    let err = client.get_secret("DB_PASSWORD").await.unwrap_err();
    assert!(matches!(err, KeyplaneError::NotFound { .. }));
}

#[tokio::test]
async fn test_secret_map_merges_groups_with_project_precedence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/7/variables"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            variable_body("SHARED", "from-group", "*"),
            variable_body("GROUP_ONLY", "g", "*"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/variables"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            variable_body("SHARED", "from-project", "*"),
            variable_body("PROJECT_ONLY", "p", "*"),
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, |spec| {
        spec.group_ids = vec!["7".to_string()];
    })
    .await;

    let map = client.get_secret_map().await.unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map["SHARED"].expose_secret(), "from-project");
    assert_eq!(map["GROUP_ONLY"].expose_secret(), "g");
    assert_eq!(map["PROJECT_ONLY"].expose_secret(), "p");
}

#[tokio::test]
async fn test_inherit_from_groups_discovers_ancestors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "id": 9 }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/9/variables/DB_PASSWORD"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(variable_body("DB_PASSWORD", "inherited", "*")),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, |spec| {
        spec.inherit_from_groups = true;
    })
    .await;

    let secret = client.get_secret("DB_PASSWORD").await.unwrap();
    assert_eq!(secret.expose_secret(), "inherited");
}

#[tokio::test]
async fn test_the_token_is_read_from_the_pinned_namespace() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/variables/DB_PASSWORD"))
        .and(header("PRIVATE-TOKEN", "infra-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(variable_body("DB_PASSWORD", "v", "*")))
        .mount(&server)
        .await;

    // The manifest pins the token reference to "infra"; the credential only
    // exists there, not in the caller namespace.
    let manifest = gitlab_manifest("ns-a", gitlab_spec(&server.uri(), Some("infra")));
    let reader =
        Arc::new(StaticCredentialReader::new().insert("infra", "gitlab-token", "token", "infra-token"));

    let schema = ProviderSchema::with_builtin_providers().unwrap();
    let provider = schema.provider_for_kind("Gitlab").unwrap();
    let client = provider.new_client(&manifest, reader, "ns-a").await.unwrap();

    let secret = client.get_secret("DB_PASSWORD").await.unwrap();
    assert_eq!(secret.expose_secret(), "v");
}

#[tokio::test]
async fn test_an_unresolvable_token_fails_client_construction() {
    let server = MockServer::start().await;
    let manifest = gitlab_manifest("ns-a", gitlab_spec(&server.uri(), None));

    let schema = ProviderSchema::with_builtin_providers().unwrap();
    let provider = schema.provider_for_kind("Gitlab").unwrap();

    // No credential in the reader at all.
    let reader = Arc::new(StaticCredentialReader::new());
    let err = provider.new_client(&manifest, reader, "ns-a").await.unwrap_err();
    assert!(matches!(err, KeyplaneError::NotFound { .. }));

    // An empty token is a credential problem.
    let reader = Arc::new(StaticCredentialReader::new().insert("ns-a", "gitlab-token", "token", ""));
    let err = provider.new_client(&manifest, reader, "ns-a").await.unwrap_err();
    assert!(matches!(err, KeyplaneError::Auth { .. }));
}
