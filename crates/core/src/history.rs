//! Bounded per-conversation turn log.
//!
//! A [`ConversationHistory`] keeps the most recent turns of one conversation,
//! oldest first. Adding a turn when the log is full evicts the oldest one, so
//! the log never grows past its capacity.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of turns kept per conversation.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Transport side tag for messages written by the human user.
pub const HUMAN_SIDE: &str = "L";

/// Transport side tag used when the bot's own messages are stored.
pub const ASSISTANT_SIDE: &str = "R";

/// Who spoke a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
}

impl Role {
    /// Map a transport side tag to a role: `"L"` is the human, anything else
    /// is the assistant.
    pub fn from_side(side: &str) -> Self {
        if side == HUMAN_SIDE {
            Role::Human
        } else {
            Role::Assistant
        }
    }

    /// The side tag this role is stored under on the transport.
    pub fn side(self) -> &'static str {
        match self {
            Role::Human => HUMAN_SIDE,
            Role::Assistant => ASSISTANT_SIDE,
        }
    }
}

/// One message exchanged in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A prior message as returned by the transport's history fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub text: String,
    pub side: String,
}

impl HistoryMessage {
    pub fn new(text: impl Into<String>, side: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            side: side.into(),
        }
    }
}

/// Capacity-bounded, ordered log of turns for one conversation.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationHistory {
    /// Create an empty history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an empty history holding at most `capacity` turns (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a history by replaying prior transport messages in order.
    pub fn create(prior: &[HistoryMessage]) -> Self {
        Self::create_with_capacity(prior, DEFAULT_HISTORY_CAPACITY)
    }

    /// Same as [`ConversationHistory::create`] with an explicit capacity.
    pub fn create_with_capacity(prior: &[HistoryMessage], capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        for message in prior {
            history.add_message(message.text.clone(), &message.side);
        }
        history
    }

    /// Append a message tagged with a transport side.
    pub fn add_message(&mut self, text: impl Into<String>, side: &str) {
        self.add_turn(Turn {
            role: Role::from_side(side),
            text: text.into(),
        });
    }

    /// Append the raw model output for this conversation.
    ///
    /// Stored as an assistant turn whatever role `turn` carries.
    pub fn add_assistant_message(&mut self, turn: Turn) {
        self.add_turn(Turn {
            role: Role::Assistant,
            text: turn.text,
        });
    }

    /// Append a turn, evicting the oldest one when full.
    pub fn add_turn(&mut self, turn: Turn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Turns, oldest first.
    pub fn turns(&self) -> impl ExactSizeIterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Snapshot of the turns, oldest first.
    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}
