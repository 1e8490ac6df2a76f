//! Azure OpenAI embeddings provider for Murmur
//!
//! Calls `POST {endpoint}/openai/deployments/{deployment}/embeddings` with
//! `{"input": text}` and reads `data[0].embedding` from the response.

#![warn(missing_docs)]
#![warn(clippy::all)]

use async_trait::async_trait;
use murmur_core::{
    get_env, Embedding, EmbeddingProvider, EmbeddingSettings, MurmurError, Result, SearchContext,
    OPENAI_SCOPE,
};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// API key that switches authentication from bearer tokens to the `api-key` header
pub const ENV_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";

/// Embeddings request body
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
}

/// Embeddings response body
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Parse an embeddings response body.
///
/// A body without `data[0].embedding` is an error, never a default vector.
pub fn parse_embedding_response(body: &str) -> Result<Embedding> {
    let response: EmbeddingResponse = serde_json::from_str(body).map_err(|e| {
        MurmurError::embedding(format!("Unexpected embedding response ({}): {}", e, body))
    })?;

    let first = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| MurmurError::embedding("Embedding response contained no data"))?;

    if first.embedding.is_empty() {
        return Err(MurmurError::embedding("Embedding response contained an empty vector"));
    }

    Ok(Embedding::new(first.embedding))
}

/// How requests authenticate
#[derive(Clone)]
enum Auth {
    /// Static resource key sent as `api-key`
    ApiKey(String),
    /// Bearer token for [`OPENAI_SCOPE`] from the context credential
    Bearer,
}

/// Azure OpenAI embeddings client
pub struct AzureOpenAIEmbeddings {
    client: Client,
    context: SearchContext,
    settings: EmbeddingSettings,
    auth: Auth,
}

impl AzureOpenAIEmbeddings {
    /// Create a provider for the context's embedding settings.
    ///
    /// Uses `AZURE_OPENAI_API_KEY` when set, otherwise bearer tokens from the
    /// context credential.
    pub fn new(context: SearchContext) -> Result<Self> {
        let api_key = get_env(ENV_OPENAI_API_KEY);
        Self::with_api_key(context, api_key)
    }

    /// Create a provider with an explicit API key choice
    pub fn with_api_key(context: SearchContext, api_key: Option<String>) -> Result<Self> {
        let settings = context.settings().embedding.clone();
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(Duration::from_secs(10).min(settings.timeout))
            .build()
            .map_err(|e| MurmurError::config(format!("Failed to create HTTP client: {}", e)))?;

        let auth = match api_key {
            Some(key) => Auth::ApiKey(key),
            None => Auth::Bearer,
        };

        Ok(Self {
            client,
            context,
            settings,
            auth,
        })
    }

    async fn auth_header(&self) -> Result<(header::HeaderName, header::HeaderValue)> {
        let (name, value) = match &self.auth {
            Auth::ApiKey(key) => (header::HeaderName::from_static("api-key"), key.clone()),
            Auth::Bearer => {
                let token = self.context.credential().get_token(OPENAI_SCOPE).await?;
                (header::AUTHORIZATION, format!("Bearer {}", token.secret()))
            }
        };
        let mut value = header::HeaderValue::from_str(&value)
            .map_err(|e| MurmurError::config(format!("Invalid credential for embeddings: {}", e)))?;
        value.set_sensitive(true);
        Ok((name, value))
    }
}

#[async_trait]
impl EmbeddingProvider for AzureOpenAIEmbeddings {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        if text.trim().is_empty() {
            return Err(MurmurError::validation(
                "query_text",
                "query text must not be empty",
            ));
        }

        let (auth_name, auth_value) = self.auth_header().await?;
        let url = self.settings.url();
        debug!(
            "Requesting embedding from deployment '{}' ({} chars)",
            self.settings.deployment,
            text.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header(auth_name, auth_value)
            .json(&EmbeddingRequest { input: text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MurmurError::embedding(format!(
                        "Embedding request timed out after {:?}",
                        self.settings.timeout
                    ))
                } else {
                    MurmurError::embedding(format!("Embedding request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read response body: {}", e));

        if !status.is_success() {
            warn!("Embedding provider returned {}", status);
            return Err(MurmurError::embedding_status(status.as_u16(), body));
        }

        let embedding = parse_embedding_response(&body)?;
        info!("Retrieved embedding with {} dimensions", embedding.dimension());
        Ok(embedding)
    }

    fn name(&self) -> &str {
        "azure-openai"
    }
}
