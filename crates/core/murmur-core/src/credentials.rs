//! Access tokens for the store and the embedding provider
//!
//! Acquisition and refresh live outside Murmur. A credential is built once at
//! process start and only read afterwards.

use crate::config::get_env;
use crate::{MurmurError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

/// Token scope for Azure Database for PostgreSQL (Entra ID auth)
pub const SQL_SCOPE: &str = "https://ossrdbms-aad.database.windows.net/.default";

/// Token scope for Azure OpenAI
pub const OPENAI_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Token for the store scope
pub const ENV_SQL_TOKEN: &str = "MURMUR_SQL_TOKEN";
/// Token for the Azure OpenAI scope
pub const ENV_OPENAI_TOKEN: &str = "MURMUR_OPENAI_TOKEN";
/// Token used for any scope without its own
pub const ENV_ACCESS_TOKEN: &str = "AZURE_ACCESS_TOKEN";

/// A bearer token; the secret never appears in Debug output
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token string
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw token value
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(REDACTED)")
    }
}

/// Source of access tokens per scope
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Token valid for `scope`
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

/// Credential holding pre-acquired tokens
#[derive(Debug, Clone, Default)]
pub struct StaticTokenCredential {
    tokens: HashMap<String, AccessToken>,
    fallback: Option<AccessToken>,
}

impl StaticTokenCredential {
    /// Empty credential
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token for one scope
    pub fn with_scope(mut self, scope: impl Into<String>, token: AccessToken) -> Self {
        self.tokens.insert(scope.into(), token);
        self
    }

    /// Token returned for scopes without their own
    pub fn with_fallback(mut self, token: AccessToken) -> Self {
        self.fallback = Some(token);
        self
    }

    /// Read `MURMUR_SQL_TOKEN`, `MURMUR_OPENAI_TOKEN` and `AZURE_ACCESS_TOKEN`
    pub fn from_env() -> Self {
        let mut credential = Self::new();
        if let Some(token) = get_env(ENV_SQL_TOKEN) {
            credential = credential.with_scope(SQL_SCOPE, AccessToken::new(token));
        }
        if let Some(token) = get_env(ENV_OPENAI_TOKEN) {
            credential = credential.with_scope(OPENAI_SCOPE, AccessToken::new(token));
        }
        if let Some(token) = get_env(ENV_ACCESS_TOKEN) {
            credential = credential.with_fallback(AccessToken::new(token));
        }
        credential
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        self.tokens
            .get(scope)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| {
                MurmurError::config(format!(
                    "No access token configured for scope '{}' (set {} or a scope-specific token)",
                    scope, ENV_ACCESS_TOKEN
                ))
            })
    }
}
