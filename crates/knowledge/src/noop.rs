use async_trait::async_trait;
use docbot_core::error::RetrievalError;
use docbot_core::retriever::{Document, Retriever};

/// Retriever with no documents. Used when no docs directory is configured.
pub struct NoopRetriever;

#[async_trait]
impl Retriever for NoopRetriever {
    fn name(&self) -> &str {
        "none"
    }

    async fn retrieve(&self, _query: &str, _top_k: usize) -> Result<Vec<Document>, RetrievalError> {
        Ok(Vec::new())
    }
}
