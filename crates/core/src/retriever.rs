//! Retriever trait — document lookup for grounding answers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A retrieved passage of documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The passage text.
    pub content: String,

    /// Human-readable source label (relative file path, URL, ...).
    pub source: String,

    /// Relevance score set by the retriever (higher is better).
    #[serde(default)]
    pub score: f32,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            score: 0.0,
        }
    }
}

/// The core Retriever trait.
///
/// Implementations: in-process embedding index, no-op.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The backend name (e.g., "embedding_index", "none").
    fn name(&self) -> &str;

    /// Return up to `top_k` documents relevant to `query`, best first.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>, RetrievalError>;
}
