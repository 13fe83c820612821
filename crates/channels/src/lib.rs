//! Chat transports for DocBot.
//!
//! Each transport implements `docbot_core::Channel`: it yields inbound
//! messages and carries replies, the typing indicator and stored history.
//!
//! Available transports:
//! - **CLI** — Interactive terminal chat (stdin/stdout) with an in-memory transcript

pub mod cli;

pub use cli::{CLI_CHAT_ID, CliChannel};
