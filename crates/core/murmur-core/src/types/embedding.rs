//! Query embedding vectors

use crate::{MurmurError, Result};
use serde::{Deserialize, Serialize};

/// Default dimension of Azure OpenAI `text-embedding-ada-002` vectors
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;

/// Fixed-length vector representing the semantic content of the query text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Wrap raw vector values
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Number of dimensions
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Vector values
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    /// Fail unless the vector matches the store's declared dimension
    pub fn ensure_dimension(&self, expected: usize) -> Result<()> {
        if self.dimension() != expected {
            return Err(MurmurError::dimension_mismatch(self.dimension(), expected));
        }
        Ok(())
    }

    /// Text encoding accepted by a `::vector` cast, e.g. `[0.1,-0.2,0.3]`
    pub fn to_vector_literal(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        format!("[{}]", parts.join(","))
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}
