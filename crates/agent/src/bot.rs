//! DocBot — the message-handling loop.
//!
//! Every inbound message is either a command (handled immediately, at most one
//! reply) or a question. A question goes through:
//!
//! 1. Typing indicator on
//! 2. History lookup, pulling prior messages from the transport on first contact
//! 3. Pipeline invocation with the question and the history
//! 4. Both turns recorded into the history
//! 5. Blank-line cleanup, then chunked dispatch in order
//! 6. Typing indicator off, whatever happened before
//!
//! [`DocBot::run`] gives each conversation its own queue drained by a single
//! worker task, so messages of one conversation are handled one at a time in
//! arrival order while other conversations proceed concurrently. The
//! conversation's history lock is held from typing-on to typing-off.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use docbot_config::BotConfig;
use docbot_core::channel::{Channel, ChannelMessage};
use docbot_core::chunk::split_text;
use docbot_core::error::{ChannelError, Error};
use docbot_core::history::{ConversationHistory, HUMAN_SIDE, Turn};
use docbot_core::message::ConversationId;
use docbot_core::pipeline::{Pipeline, PipelineInput};
use regex::Regex;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::commands::{self, Command};

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Collapse runs of blank lines into single newlines and trim.
pub fn post_process(text: &str) -> String {
    BLANK_LINES.replace_all(text, "\n").trim().to_string()
}

/// A conversation's history, loaded from the transport on first use.
type HistorySlot = Arc<Mutex<Option<ConversationHistory>>>;

pub struct DocBot {
    name: String,
    channel: Arc<dyn Channel>,
    pipeline: Arc<dyn Pipeline>,
    config: BotConfig,
    debug: AtomicBool,
    conversations: Mutex<HashMap<ConversationId, HistorySlot>>,
}

impl DocBot {
    pub fn new(
        name: impl Into<String>,
        channel: Arc<dyn Channel>,
        pipeline: Arc<dyn Pipeline>,
        config: BotConfig,
    ) -> Self {
        Self {
            name: name.into(),
            channel,
            pipeline,
            debug: AtomicBool::new(config.debug),
            config,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.load(Ordering::SeqCst)
    }

    /// Largest outbound chunk: the configured limit, capped by the transport's.
    pub fn max_message_bytes(&self) -> usize {
        self.config.max_message_bytes.min(self.channel.max_message_bytes())
    }

    /// Turns currently held for `chat_id`, oldest first. Empty if never loaded.
    pub async fn history_snapshot(&self, chat_id: &str) -> Vec<Turn> {
        let slot = self
            .conversations
            .lock()
            .await
            .get(&ConversationId::from(chat_id))
            .cloned();
        match slot {
            Some(slot) => slot.lock().await.as_ref().map(|h| h.to_vec()).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Consume inbound messages until the transport closes.
    ///
    /// Messages are routed to one worker per conversation. Waits for queued
    /// messages before returning. A transport error ends the loop and is
    /// returned once those messages are done.
    pub async fn run(
        self: Arc<Self>,
        mut inbound: mpsc::Receiver<Result<ChannelMessage, ChannelError>>,
    ) -> Result<(), Error> {
        let mut workers: HashMap<ConversationId, mpsc::UnboundedSender<ChannelMessage>> =
            HashMap::new();
        let mut tasks = JoinSet::new();
        let mut outcome = Ok(());

        while let Some(item) = inbound.recv().await {
            let message = match item {
                Ok(message) => message,
                Err(e) => {
                    error!(
                        channel = self.channel.name(),
                        error = %e,
                        "Transport failure, stopping"
                    );
                    outcome = Err(e.into());
                    break;
                }
            };

            let conversation = ConversationId::from(message.chat_id.as_str());
            let message = match workers.get(&conversation) {
                Some(queue) => match queue.send(message) {
                    Ok(()) => continue,
                    Err(mpsc::error::SendError(message)) => message,
                },
                None => message,
            };

            let (queue, mut pending) = mpsc::unbounded_channel();
            if queue.send(message).is_err() {
                continue;
            }
            let bot = self.clone();
            tasks.spawn(async move {
                while let Some(message) = pending.recv().await {
                    bot.handle_message(message).await;
                }
            });
            debug!(chat_id = %conversation, "Started conversation worker");
            workers.insert(conversation, queue);
        }

        // Closing the queues lets each worker finish what it holds and exit
        drop(workers);
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Conversation worker panicked");
            }
        }
        info!(channel = self.channel.name(), "Inbound stream closed");
        outcome
    }

    /// Handle one inbound message. Never fails: errors are logged and, in
    /// debug mode, echoed to the conversation.
    pub async fn handle_message(&self, message: ChannelMessage) {
        let chat_id = message.chat_id.as_str();
        info!(chat_id = %chat_id, sender = %message.sender_id, "Inbound message");

        if let Some(command) = Command::parse(&message.content, self.config.command_prefix) {
            if let Err(e) = self.handle_command(command, chat_id).await {
                error!(chat_id = %chat_id, error = %e, "Command failed");
            }
            return;
        }

        let slot = self.slot(chat_id).await;
        let mut history = slot.lock().await;

        if let Err(e) = self.answer(chat_id, &message.content, &mut history).await {
            error!(chat_id = %chat_id, error = %e, "Failed to answer message");
            if self.debug_enabled() {
                self.report_failure(chat_id, &e).await;
            }
        }

        if let Err(e) = self.channel.send_typing(chat_id, false).await {
            warn!(chat_id = %chat_id, error = %e, "Could not clear typing indicator");
        }
    }

    /// Send the failure to the conversation, cut to the transport's limit.
    async fn report_failure(&self, chat_id: &str, err: &Error) {
        let max_bytes = self.max_message_bytes();
        let report = format!("[{}] failed to answer\n{err}", self.name);
        let wrapped = report
            .split('\n')
            .flat_map(|line| wrap_line(line, max_bytes.saturating_sub(1)))
            .collect::<Vec<_>>()
            .join("\n");

        let chunks = match split_text(&wrapped, max_bytes) {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "Error report does not fit the transport");
                return;
            }
        };
        for chunk in &chunks {
            if let Err(e) = self.channel.send(chat_id, chunk).await {
                warn!(chat_id = %chat_id, error = %e, "Could not deliver error report");
                return;
            }
        }
    }

    /// Run a command. Produces at most one reply.
    pub async fn handle_command(&self, command: Command, chat_id: &str) -> Result<(), Error> {
        info!(chat_id = %chat_id, command = ?command, "Handling command");
        let prefix = self.config.command_prefix;

        let reply = match command {
            Command::ClearHistory => {
                self.clear_history(chat_id).await?;
                commands::CLEARED_REPLY.to_string()
            }
            Command::ToggleDebug => {
                let enabled = !self.debug.fetch_xor(true, Ordering::SeqCst);
                info!(debug = enabled, "Debug mode toggled");
                commands::debug_reply(enabled)
            }
            Command::Help => commands::command_list(prefix, self.debug_enabled()),
            Command::Unknown(text) => {
                warn!(chat_id = %chat_id, command = %text, "Unknown command");
                commands::unknown_reply(&text, prefix, self.debug_enabled())
            }
        };

        self.channel.send(chat_id, &reply).await?;
        Ok(())
    }

    /// Forget the conversation here and on the transport.
    async fn clear_history(&self, chat_id: &str) -> Result<(), Error> {
        let slot = self.slot(chat_id).await;
        let mut history = slot.lock().await;
        *history = None;
        self.channel.clear_history(chat_id).await?;
        debug!(chat_id = %chat_id, "History cleared");
        Ok(())
    }

    async fn answer(
        &self,
        chat_id: &str,
        question: &str,
        slot: &mut Option<ConversationHistory>,
    ) -> Result<(), Error> {
        self.channel.send_typing(chat_id, true).await?;

        let history = match slot.take() {
            Some(history) => history,
            None => self.load_history(chat_id, question).await?,
        };
        let history = slot.insert(history);

        let turns = history.to_vec();
        let raw = self
            .pipeline
            .invoke(PipelineInput {
                question,
                history: &turns,
            })
            .await?;

        history.add_message(question, HUMAN_SIDE);
        history.add_assistant_message(Turn::assistant(raw.as_str()));

        let reply = post_process(&raw);
        if reply.is_empty() {
            debug!(chat_id = %chat_id, "Empty answer, nothing to send");
            return Ok(());
        }

        let chunks = split_text(&reply, self.max_message_bytes())?;
        info!(chat_id = %chat_id, chunks = chunks.len(), bytes = reply.len(), "Sending answer");
        for chunk in &chunks {
            self.channel.send(chat_id, chunk).await?;
        }
        Ok(())
    }

    /// Build a history from what the transport already holds.
    ///
    /// The transport may already store the message being answered, and any
    /// questions queued behind it, as a trailing run of unanswered human
    /// messages. That run is cut from the question onward; those messages
    /// get recorded as they are answered.
    async fn load_history(
        &self,
        chat_id: &str,
        question: &str,
    ) -> Result<ConversationHistory, Error> {
        let mut prior = self
            .channel
            .history(chat_id, self.config.history_fetch_limit)
            .await?;

        let unanswered = prior
            .iter()
            .rposition(|m| m.side != HUMAN_SIDE)
            .map_or(0, |i| i + 1);
        if let Some(offset) = prior[unanswered..].iter().position(|m| m.text == question) {
            prior.truncate(unanswered + offset);
        }
        debug!(chat_id = %chat_id, messages = prior.len(), "Replaying transport history");
        Ok(ConversationHistory::create_with_capacity(&prior, self.config.history_capacity))
    }

    async fn slot(&self, chat_id: &str) -> HistorySlot {
        self.conversations
            .lock()
            .await
            .entry(ConversationId::from(chat_id))
            .or_default()
            .clone()
    }
}

/// Cut `line` into pieces of at most `max_bytes`, on char boundaries.
fn wrap_line(line: &str, max_bytes: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = line;
    while rest.len() > max_bytes {
        let mut end = max_bytes;
        while end > 0 && !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            break;
        }
        let (head, tail) = rest.split_at(end);
        pieces.push(head);
        rest = tail;
    }
    pieces.push(rest);
    pieces
}
