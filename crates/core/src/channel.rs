//! Channel trait — the abstraction over the messaging transport.
//!
//! A Channel connects DocBot to a messaging platform. It yields inbound chat
//! messages, sends replies, toggles the typing indicator, and exposes the
//! platform's stored conversation history.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chunk::DEFAULT_MAX_MESSAGE_BYTES;
use crate::error::ChannelError;
use crate::history::HistoryMessage;

/// Unique identifier for a channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message received from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// The channel this message belongs to
    pub channel_id: ChannelId,

    /// Sender identifier (platform-specific user ID)
    pub sender_id: String,

    /// The text content
    pub content: String,

    /// The conversation identifier within the channel
    pub chat_id: String,
}

/// The core Channel trait.
///
/// Implementations handle platform-specific connection logic and message
/// formatting. The bot never talks to a platform SDK directly.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "cli").
    fn name(&self) -> &str;

    /// Unique ID for this channel instance.
    fn id(&self) -> &ChannelId;

    /// Start listening for incoming messages.
    ///
    /// Returns a receiver that yields incoming chat messages. The channel
    /// implementation handles polling or socket connections internally.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<ChannelMessage, ChannelError>>,
        ChannelError,
    >;

    /// Send a message to a conversation.
    async fn send(&self, chat_id: &str, content: &str) -> std::result::Result<(), ChannelError>;

    /// Turn the typing indicator on or off (if the platform supports it).
    async fn send_typing(
        &self,
        _chat_id: &str,
        _typing: bool,
    ) -> std::result::Result<(), ChannelError> {
        Ok(()) // No-op default
    }

    /// Fetch up to `limit` prior messages of a conversation, oldest first.
    async fn history(
        &self,
        _chat_id: &str,
        _limit: usize,
    ) -> std::result::Result<Vec<HistoryMessage>, ChannelError> {
        Ok(Vec::new())
    }

    /// Remove the stored messages of a conversation on the platform side.
    async fn clear_history(&self, _chat_id: &str) -> std::result::Result<(), ChannelError> {
        Ok(())
    }

    /// Largest message the platform accepts, in bytes.
    fn max_message_bytes(&self) -> usize {
        DEFAULT_MAX_MESSAGE_BYTES
    }

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }

    /// Health check — is the channel connected and operational?
    async fn health_check(&self) -> std::result::Result<bool, ChannelError> {
        Ok(true)
    }
}
