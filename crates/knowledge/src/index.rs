//! In-process embedding index.
//!
//! Passages are embedded through the configured provider's `/embeddings`
//! endpoint when added, and queries are embedded the same way at retrieval
//! time. Everything lives in memory for the life of the process.

use std::sync::Arc;

use async_trait::async_trait;
use docbot_core::error::RetrievalError;
use docbot_core::provider::{EmbeddingRequest, Provider};
use docbot_core::retriever::{Document, Retriever};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::vector::{Passage, rank_passages};

/// Inputs sent per embedding request.
const EMBED_BATCH_SIZE: usize = 32;

pub struct EmbeddingIndex {
    name: String,
    provider: Arc<dyn Provider>,
    model: String,
    min_score: f32,
    passages: RwLock<Vec<Passage>>,
}

impl EmbeddingIndex {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            model: model.into(),
            min_score: 0.0,
            passages: RwLock::new(Vec::new()),
        }
    }

    /// Drop results scoring below `min_score`.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Embed and store `documents`. Returns the number of passages added.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, RetrievalError> {
        let mut added = Vec::with_capacity(documents.len());

        for batch in documents.chunks(EMBED_BATCH_SIZE) {
            let inputs: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let embeddings = self.embed(inputs).await?;

            added.extend(batch.iter().cloned().zip(embeddings).map(|(document, embedding)| Passage {
                document,
                embedding,
            }));
        }

        let count = added.len();
        self.passages.write().await.extend(added);
        info!(index = %self.name, added = count, "Indexed documentation passages");
        Ok(count)
    }

    /// Number of stored passages.
    pub async fn len(&self) -> usize {
        self.passages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.passages.read().await.is_empty()
    }

    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let expected = inputs.len();
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs,
            })
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

        if response.embeddings.len() != expected {
            return Err(RetrievalError::EmbeddingFailed(format!(
                "expected {expected} embeddings, got {}",
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings)
    }
}

#[async_trait]
impl Retriever for EmbeddingIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>, RetrievalError> {
        if self.is_empty().await {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embed(vec![query.to_string()])
            .await?
            .pop()
            .ok_or_else(|| RetrievalError::QueryFailed("no embedding returned for query".into()))?;

        let passages = self.passages.read().await;
        let results = rank_passages(&passages, &query_embedding, top_k, self.min_score);
        debug!(
            index = %self.name,
            query_len = query.len(),
            results = results.len(),
            "Retrieved passages"
        );
        Ok(results)
    }
}
