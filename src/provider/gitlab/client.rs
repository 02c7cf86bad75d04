//! GitLab variables API session.
//!
//! Construction performs no network round-trip; the first request happens
//! inside the `SecretsClient` calls. Project variables take precedence over
//! group variables with the same key.

use crate::domain::GitlabProviderSpec;
use crate::errors::{KeyplaneError, Result};
use crate::provider::client::{SecretString, SecretsClient};
use crate::provider::ValidationResult;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Default instance when the store spec leaves `url` empty.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

const API_PREFIX: &str = "api/v4";

/// One CI/CD variable as returned by the variables API
#[derive(Debug, Deserialize)]
struct GitlabVariable {
    key: String,
    value: String,
    #[serde(default = "wildcard_scope")]
    environment_scope: String,
}

fn wildcard_scope() -> String {
    "*".to_string()
}

/// Ancestor group entry from the project groups API
#[derive(Debug, Deserialize)]
struct GitlabGroup {
    id: u64,
}

/// Read-only session against one GitLab instance
#[derive(Debug)]
pub struct GitlabClient {
    http: reqwest::Client,
    base: Url,
    token: SecretString,
    project_id: String,
    group_ids: Vec<String>,
    inherit_from_groups: bool,
    environment: Option<String>,
}

impl GitlabClient {
    /// Build a session from a typed spec and a resolved access token.
    pub fn new(spec: &GitlabProviderSpec, token: SecretString) -> Result<Self> {
        let raw_url = if spec.url.is_empty() { DEFAULT_GITLAB_URL } else { spec.url.as_str() };
        let base = Url::parse(raw_url)
            .map_err(|err| KeyplaneError::config(format!("invalid GitLab url '{}': {}", raw_url, err)))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| KeyplaneError::config(format!("failed to build HTTP client: {}", err)))?;

        Ok(Self {
            http,
            base,
            token,
            project_id: spec.project_id.clone(),
            group_ids: spec.group_ids.clone(),
            inherit_from_groups: spec.inherit_from_groups,
            environment: spec.environment.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(&format!("{}/{}", API_PREFIX, path))
            .map_err(|err| KeyplaneError::internal(format!("failed to build GitLab url: {}", err)))
    }

    /// Whether a variable's environment scope applies to this session
    fn scope_matches(&self, scope: &str) -> bool {
        match &self.environment {
            None => true,
            Some(environment) => scope == "*" || scope == environment,
        }
    }

    /// Group ids to consult: the declared list, or the project's ancestor
    /// groups when `inherit_from_groups` is set.
    async fn effective_groups(&self) -> Result<Vec<String>> {
        if !self.group_ids.is_empty() {
            return Ok(self.group_ids.clone());
        }
        if !self.inherit_from_groups || self.project_id.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint(&format!("projects/{}/groups", self.project_id))?;
        let response = self.send(url).await?;
        match response.status() {
            StatusCode::OK => {
                let groups: Vec<GitlabGroup> = response
                    .json()
                    .await
                    .map_err(|err| KeyplaneError::backend(format!("invalid group listing: {}", err)))?;
                Ok(groups.into_iter().map(|group| group.id.to_string()).collect())
            }
            status => Err(KeyplaneError::backend(format!(
                "GitLab returned {} while listing ancestor groups of project '{}'",
                status, self.project_id
            ))),
        }
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response> {
        self.http
            .get(url)
            .header("PRIVATE-TOKEN", self.token.expose_secret())
            .send()
            .await
            .map_err(|err| KeyplaneError::backend(format!("GitLab request failed: {}", err)))
    }

    /// Fetch a single variable; `Ok(None)` when absent or out of scope.
    async fn fetch_variable(&self, path: String, key: &str) -> Result<Option<SecretString>> {
        let url = self.endpoint(&path)?;
        let response = self.send(url).await?;
        match response.status() {
            StatusCode::OK => {
                let variable: GitlabVariable = response
                    .json()
                    .await
                    .map_err(|err| KeyplaneError::backend(format!("invalid variable payload: {}", err)))?;
                if self.scope_matches(&variable.environment_scope) {
                    Ok(Some(SecretString::new(variable.value)))
                } else {
                    debug!(key, scope = %variable.environment_scope, "Variable out of environment scope");
                    Ok(None)
                }
            }
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(KeyplaneError::auth(format!(
                "GitLab rejected the access token ({})",
                response.status()
            ))),
            status => {
                Err(KeyplaneError::backend(format!("GitLab returned {} for variable '{}'", status, key)))
            }
        }
    }

    /// List every variable behind a collection endpoint.
    async fn list_variables(&self, path: String) -> Result<Vec<GitlabVariable>> {
        let mut url = self.endpoint(&path)?;
        url.query_pairs_mut().append_pair("per_page", "100");
        let response = self.send(url).await?;
        match response.status() {
            StatusCode::OK => response
                .json()
                .await
                .map_err(|err| KeyplaneError::backend(format!("invalid variable listing: {}", err))),
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(KeyplaneError::auth(format!(
                "GitLab rejected the access token ({})",
                response.status()
            ))),
            status => {
                Err(KeyplaneError::backend(format!("GitLab returned {} listing '{}'", status, path)))
            }
        }
    }
}

#[async_trait]
impl SecretsClient for GitlabClient {
    async fn get_secret(&self, key: &str) -> Result<SecretString> {
        if !self.project_id.is_empty() {
            let path = format!("projects/{}/variables/{}", self.project_id, key);
            if let Some(value) = self.fetch_variable(path, key).await? {
                return Ok(value);
            }
        }

        for group in self.effective_groups().await? {
            let path = format!("groups/{}/variables/{}", group, key);
            if let Some(value) = self.fetch_variable(path, key).await? {
                return Ok(value);
            }
        }

        Err(KeyplaneError::not_found(key))
    }

    async fn get_secret_map(&self) -> Result<BTreeMap<String, SecretString>> {
        let mut secrets = BTreeMap::new();

        // Group variables first so project variables override them.
        for group in self.effective_groups().await? {
            for variable in self.list_variables(format!("groups/{}/variables", group)).await? {
                if self.scope_matches(&variable.environment_scope) {
                    secrets.insert(variable.key, SecretString::new(variable.value));
                }
            }
        }

        if !self.project_id.is_empty() {
            let path = format!("projects/{}/variables", self.project_id);
            for variable in self.list_variables(path).await? {
                if self.scope_matches(&variable.environment_scope) {
                    secrets.insert(variable.key, SecretString::new(variable.value));
                }
            }
        }

        Ok(secrets)
    }

    fn validate(&self) -> ValidationResult {
        if self.token.is_empty() {
            return ValidationResult::Error;
        }
        if self.project_id.is_empty() && self.group_ids.is_empty() && !self.inherit_from_groups {
            return ValidationResult::Error;
        }
        ValidationResult::Ready
    }
}
