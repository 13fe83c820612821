//! The DocBot agent — answering documentation questions over a chat transport.
//!
//! 1. **Receive** a message from the channel
//! 2. **Dispatch** `#` commands, or
//! 3. **Answer** through the RAG pipeline: contextualize, retrieve, generate
//! 4. **Reply** in transport-sized chunks
//!
//! [`DocBot`] owns all per-conversation state; [`RagPipeline`] is the default
//! [`docbot_core::Pipeline`].

pub mod bot;
pub mod commands;
pub mod context;
pub mod rag;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use bot::{DocBot, post_process};
pub use commands::Command;
pub use context::{ContextAssembler, format_documents};
pub use rag::RagPipeline;
