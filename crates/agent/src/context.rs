//! Prompt assembly for the two LLM calls of a RAG turn.
//!
//! 1. **Contextualize**: rewrite the latest question as a standalone one
//! 2. **Answer**: answer the standalone question from retrieved documentation
//!
//! Both prompts are laid out the same way: a system message, then the
//! conversation history oldest first, then the user's question.

use docbot_config::IdentityConfig;
use docbot_core::history::{Role, Turn};
use docbot_core::message::Message;
use docbot_core::retriever::Document;

/// Join document contents with blank lines, in retrieval order.
pub fn format_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the message lists sent to the provider.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    assistant_name: String,
    subject: String,
    system_prompt_override: Option<String>,
}

impl ContextAssembler {
    pub fn new(assistant_name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            subject: subject.into(),
            system_prompt_override: None,
        }
    }

    pub fn from_identity(identity: &IdentityConfig) -> Self {
        Self {
            assistant_name: identity.assistant_name.clone(),
            subject: identity.subject.clone(),
            system_prompt_override: identity.system_prompt_override.clone(),
        }
    }

    /// Replace the answer system prompt. Retrieved context is still appended.
    pub fn with_system_prompt_override(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt_override = Some(prompt.into());
        self
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    /// Messages asking the model for a standalone version of `question`.
    pub fn contextualize(&self, question: &str, history: &[Turn]) -> Vec<Message> {
        let system = format!(
            "Given a chat history and the latest user question which might reference context \
             in the chat history, formulate a standalone question which can be understood \
             without the chat history.\n\
             Never answer the question, just reformulate it if needed and otherwise return it \
             as is.\n\
             The subject of the message is always related to {subject}. \
             When the subject of the message is not relevant, return the message as is.\n\
             Only return the reformulated question.",
            subject = self.subject
        );
        self.with_history(system, question, history)
    }

    /// Messages asking the model to answer `question` from `documents`.
    pub fn answer(&self, question: &str, history: &[Turn], documents: &[Document]) -> Vec<Message> {
        let context = format_documents(documents);
        let system = match &self.system_prompt_override {
            Some(prompt) => format!("{prompt}\n\n{context}"),
            None => format!(
                "You are an assistant named {name} for question-answering tasks \
                 specialized in {subject}.\n\
                 Use the following pieces of retrieved context to answer the question.\n\
                 If you don't know the answer, just say that you don't know.\n\
                 Keep the answer concise.\n\n\
                 {context}",
                name = self.assistant_name,
                subject = self.subject
            ),
        };
        self.with_history(system, question, history)
    }

    fn with_history(&self, system: String, question: &str, history: &[Turn]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system));
        messages.extend(history.iter().map(|turn| match turn.role {
            Role::Human => Message::user(turn.text.as_str()),
            Role::Assistant => Message::assistant(turn.text.as_str()),
        }));
        messages.push(Message::user(question));
        messages
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::from_identity(&IdentityConfig::default())
    }
}
