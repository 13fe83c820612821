//! # DocBot Core
//!
//! Domain types, traits, and error definitions for the DocBot documentation
//! assistant. This crate has **no framework dependencies**: it defines the
//! domain model that the provider, knowledge, channel and agent crates
//! implement against.
//!
//! ## Layout
//!
//! - [`chunk`] splits long replies into transport-sized messages
//! - [`history`] keeps the bounded per-conversation turn log
//! - [`channel`], [`provider`], [`retriever`], [`pipeline`] are the seams to
//!   the messaging transport, the LLM backend, the document store and the
//!   answer pipeline

pub mod channel;
pub mod chunk;
pub mod error;
pub mod history;
pub mod message;
pub mod pipeline;
pub mod provider;
pub mod retriever;

// Re-export key types at crate root for ergonomics
pub use channel::{Channel, ChannelId, ChannelMessage};
pub use chunk::{DEFAULT_MAX_MESSAGE_BYTES, split_text};
pub use error::{
    ChannelError, ChunkError, Error, PipelineError, ProviderError, Result, RetrievalError,
};
pub use history::{ConversationHistory, HistoryMessage, Role, Turn};
pub use message::{ConversationId, Message, MessageRole};
pub use pipeline::{Pipeline, PipelineInput};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use retriever::{Document, Retriever};
