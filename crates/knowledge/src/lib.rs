//! Documentation retrieval for DocBot.
//!
//! Loads markdown docs into passages, embeds them through a provider, and
//! serves top-k similarity search through the `docbot_core::Retriever` trait.

pub mod index;
pub mod loader;
pub mod noop;
pub mod vector;

pub use index::EmbeddingIndex;
pub use loader::{load_markdown_dir, split_passages};
pub use noop::NoopRetriever;
pub use vector::cosine_similarity;
