//! Error types for the DocBot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] aggregates them.

use thiserror::Error;

/// The top-level error type for all DocBot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Pipeline errors ---
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    // --- Chunking errors ---
    #[error("Chunking error: {0}")]
    Chunk(#[from] ChunkError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Index query failed: {0}")]
    QueryFailed(String),

    #[error("Document loading failed for {path}: {reason}")]
    LoadFailed { path: String, reason: String },
}

/// Failure while invoking the retrieval + generation pipeline.
///
/// Caught per message by the orchestrator; never fatal to the event loop.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("LLM invocation failed: {0}")]
    Llm(#[from] ProviderError),

    #[error("Document retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error(
        "Line {line_number} is {line_bytes} bytes (including newline), \
         over the {max_bytes} byte message limit"
    )]
    LineTooLarge {
        line_number: usize,
        line_bytes: usize,
        max_bytes: usize,
    },
}
