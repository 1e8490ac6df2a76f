//! Embedding provider interface

use crate::types::Embedding;
use crate::Result;
use async_trait::async_trait;

/// Converts query text into an embedding vector.
///
/// Implementations may block on the network up to their configured timeout and
/// must fail rather than return a default vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one piece of text
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
