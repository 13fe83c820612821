//! RAG pipeline — Retrieval-Augmented Generation over the documentation.
//!
//! # Flow
//!
//! 1. Ask the model for a standalone version of the question (history-aware)
//! 2. Retrieve the top-k passages for that standalone question
//! 3. Answer from the retrieved passages, the history and the original question

use std::sync::Arc;

use async_trait::async_trait;
use docbot_core::error::PipelineError;
use docbot_core::message::Message;
use docbot_core::pipeline::{Pipeline, PipelineInput};
use docbot_core::provider::{Provider, ProviderRequest};
use docbot_core::retriever::Retriever;
use tracing::{debug, info};

use crate::context::ContextAssembler;

/// Default number of passages retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;

pub struct RagPipeline {
    /// LLM provider, used for both calls.
    provider: Arc<dyn Provider>,
    /// Documentation lookup.
    retriever: Arc<dyn Retriever>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    top_k: usize,
    assembler: ContextAssembler,
}

impl RagPipeline {
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            retriever,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            top_k: DEFAULT_TOP_K,
            assembler: ContextAssembler::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_assembler(mut self, assembler: ContextAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Rewrite the question so it stands without the history.
    ///
    /// Falls back to the original question when the model returns nothing.
    pub async fn contextualize(&self, input: PipelineInput<'_>) -> Result<String, PipelineError> {
        let messages = self.assembler.contextualize(input.question, input.history);
        let standalone = self.complete(messages).await?;
        let standalone = standalone.trim();

        if standalone.is_empty() {
            debug!("Contextualize returned nothing, using the original question");
            return Ok(input.question.to_string());
        }
        Ok(standalone.to_string())
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String, PipelineError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: vec![],
        };
        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }
}

#[async_trait]
impl Pipeline for RagPipeline {
    async fn invoke(&self, input: PipelineInput<'_>) -> Result<String, PipelineError> {
        info!(model = %self.model, history = input.history.len(), "RAG: contextualizing question");
        let standalone = self.contextualize(input).await?;
        info!(question = %standalone, "RAG: standalone question");

        let documents = self.retriever.retrieve(&standalone, self.top_k).await?;
        debug!(
            retriever = self.retriever.name(),
            documents = documents.len(),
            "RAG: documents retrieved"
        );

        let messages = self.assembler.answer(input.question, input.history, &documents);
        let answer = self.complete(messages).await?;
        info!(answer_len = answer.len(), "RAG: answer generated");
        Ok(answer)
    }
}
