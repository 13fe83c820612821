//! LLM provider implementations for DocBot.
//!
//! All providers implement the `docbot_core::Provider` trait.
//! The router builds the configured default provider.

pub mod fallback;
pub mod openai_compat;
pub mod router;

pub use fallback::FallbackProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
