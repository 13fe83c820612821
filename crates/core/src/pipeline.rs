//! Pipeline trait — the retrieval + generation boundary.
//!
//! The orchestrator hands a question and the current conversation history to
//! a [`Pipeline`] and gets the raw assistant text back. How documents are
//! retrieved and which model answers is the pipeline's business.

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::history::Turn;

/// Input for one pipeline invocation.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    /// The user's latest message, as received.
    pub question: &'a str,
    /// Prior turns of the conversation, oldest first.
    pub history: &'a [Turn],
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Produce the assistant's answer text for `input`.
    async fn invoke(&self, input: PipelineInput<'_>) -> Result<String, PipelineError>;
}
