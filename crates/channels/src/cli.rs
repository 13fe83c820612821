//! CLI channel — interactive terminal-based chat.
//!
//! Reads questions from stdin and prints replies to stdout. The channel keeps
//! a transcript of the session so the bot can replay or clear it like it
//! would on a hosted messaging platform.

use std::sync::Arc;

use async_trait::async_trait;
use docbot_core::channel::{Channel, ChannelId, ChannelMessage};
use docbot_core::error::ChannelError;
use docbot_core::history::{ASSISTANT_SIDE, HUMAN_SIDE, HistoryMessage};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// The single conversation a terminal session carries.
pub const CLI_CHAT_ID: &str = "cli_session";

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    id: ChannelId,
    assistant_name: String,
    transcript: Arc<Mutex<Vec<HistoryMessage>>>,
}

impl CliChannel {
    pub fn new() -> Self {
        Self {
            id: ChannelId("cli".into()),
            assistant_name: "DocBot".into(),
            transcript: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Name shown in the typing indicator.
    pub fn with_assistant_name(mut self, name: impl Into<String>) -> Self {
        self.assistant_name = name.into();
        self
    }

    /// Record a line typed by the user, as the reader task does.
    pub async fn record_inbound(&self, text: &str) {
        record(&self.transcript, text, HUMAN_SIDE).await;
    }

    /// Number of messages currently in the transcript.
    pub async fn transcript_len(&self) -> usize {
        self.transcript.lock().await.len()
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

async fn record(transcript: &Mutex<Vec<HistoryMessage>>, text: &str, side: &str) {
    transcript.lock().await.push(HistoryMessage::new(text, side));
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(32);
        let channel_id = self.id.clone();
        let transcript = self.transcript.clone();

        tokio::spawn(async move {
            let reader = BufReader::new(io::stdin());
            let mut lines = reader.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }

                        if matches!(line.as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q") {
                            break;
                        }

                        record(&transcript, &line, HUMAN_SIDE).await;

                        let msg = ChannelMessage {
                            channel_id: channel_id.clone(),
                            sender_id: "local_user".into(),
                            content: line,
                            chat_id: CLI_CHAT_ID.into(),
                        };

                        if tx.send(Ok(msg)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                        break;
                    }
                }
            }
            debug!("stdin closed");
        });

        Ok(rx)
    }

    async fn send(&self, _chat_id: &str, content: &str) -> Result<(), ChannelError> {
        println!("{content}");
        record(&self.transcript, content, ASSISTANT_SIDE).await;
        Ok(())
    }

    async fn send_typing(&self, _chat_id: &str, typing: bool) -> Result<(), ChannelError> {
        if typing {
            println!("{} is typing...", self.assistant_name);
        }
        Ok(())
    }

    async fn history(
        &self,
        _chat_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, ChannelError> {
        let transcript = self.transcript.lock().await;
        let start = transcript.len().saturating_sub(limit);
        Ok(transcript[start..].to_vec())
    }

    async fn clear_history(&self, _chat_id: &str) -> Result<(), ChannelError> {
        self.transcript.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_channel_properties() {
        let ch = CliChannel::new();
        assert_eq!(ch.name(), "cli");
        assert_eq!(ch.id().0, "cli");
    }

    #[tokio::test]
    async fn transcript_records_both_sides() {
        let ch = CliChannel::new();
        ch.record_inbound("How do I create a bubble?").await;
        ch.send(CLI_CHAT_ID, "Use createBubble.").await.unwrap();

        let history = ch.history(CLI_CHAT_ID, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].side, HUMAN_SIDE);
        assert_eq!(history[1].side, ASSISTANT_SIDE);
        assert_eq!(history[1].text, "Use createBubble.");
    }

    #[tokio::test]
    async fn history_returns_most_recent_oldest_first() {
        let ch = CliChannel::new();
        for i in 0..5 {
            ch.record_inbound(&format!("q{i}")).await;
        }

        let history = ch.history(CLI_CHAT_ID, 2).await.unwrap();
        let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["q3", "q4"]);
    }

    #[tokio::test]
    async fn clear_history_empties_transcript() {
        let ch = CliChannel::new();
        ch.record_inbound("hello").await;
        ch.clear_history(CLI_CHAT_ID).await.unwrap();
        assert_eq!(ch.transcript_len().await, 0);
        assert!(ch.history(CLI_CHAT_ID, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn typing_is_accepted() {
        let ch = CliChannel::new().with_assistant_name("RainBot");
        assert!(ch.send_typing(CLI_CHAT_ID, true).await.is_ok());
        assert!(ch.send_typing(CLI_CHAT_ID, false).await.is_ok());
    }
}
