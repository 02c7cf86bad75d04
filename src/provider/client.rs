//! Backend session trait and secure secret values.

use super::ValidationResult;
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string wrapper that redacts its contents in Debug, Display, and
/// serialization.
///
/// Secret payloads cross the provider boundary only as this type, so a
/// stray log line or serialized error never carries a credential. The
/// underlying memory is zeroed on drop; the actual value is only reachable
/// through [`SecretString::expose_secret`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new SecretString from a string value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value.
    ///
    /// Only call this where the value is actually consumed (request
    /// headers, files); never log or print the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret without exposing the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Never serialize the actual secret value.
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A live session against one external secret store.
///
/// Produced by [`Provider::new_client`]; scoped to a single namespace and a
/// single store configuration.
///
/// [`Provider::new_client`]: super::Provider::new_client
#[async_trait]
pub trait SecretsClient: Send + Sync + fmt::Debug {
    /// Fetch a single secret value by backend-specific key
    async fn get_secret(&self, key: &str) -> Result<SecretString>;

    /// Fetch every secret the session can see, keyed by backend key
    async fn get_secret_map(&self) -> Result<BTreeMap<String, SecretString>>;

    /// Store a secret value.
    ///
    /// Only sessions whose provider declares write capability override
    /// this; the default refuses.
    async fn set_secret(&self, key: &str, _value: SecretString) -> Result<()> {
        Err(crate::errors::KeyplaneError::backend(format!(
            "cannot set secret '{}': session is read-only",
            key
        )))
    }

    /// Whether the session is usable as configured
    fn validate(&self) -> ValidationResult;

    /// Release any resources held by the session
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
