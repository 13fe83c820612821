//! Shared test doubles for the agent crate.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docbot_core::channel::{Channel, ChannelId, ChannelMessage};
use docbot_core::error::{ChannelError, PipelineError, ProviderError, RetrievalError};
use docbot_core::history::{HistoryMessage, Turn};
use docbot_core::message::Message;
use docbot_core::pipeline::{Pipeline, PipelineInput};
use docbot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use docbot_core::retriever::{Document, Retriever};
use tokio::sync::mpsc;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Vec<String>,
    error: Option<ProviderError>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|r| r.to_string()).collect(),
            error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(&[])
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        requests.push(request);

        let text = self.responses.get(call).unwrap_or_else(|| {
            panic!(
                "SequentialMockProvider: no more responses (call #{call}, have {})",
                self.responses.len()
            )
        });
        Ok(ProviderResponse {
            message: Message::assistant(text.as_str()),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// Retriever returning fixed documents and recording queries.
pub struct MockRetriever {
    documents: Vec<Document>,
    error: Option<String>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl MockRetriever {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: RetrievalError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(vec![])
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn last_top_k(&self) -> Option<usize> {
        self.calls.lock().unwrap().last().map(|(_, k)| *k)
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    fn name(&self) -> &str {
        "mock"
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>, RetrievalError> {
        self.calls.lock().unwrap().push((query.to_string(), top_k));
        if let Some(error) = &self.error {
            return Err(RetrievalError::QueryFailed(error.clone()));
        }
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }
}

/// Pipeline answering every question with the same text.
pub struct ScriptedPipeline {
    answer: String,
    error: Option<String>,
    delay: Duration,
    inputs: Mutex<Vec<(String, Vec<Turn>)>>,
}

impl ScriptedPipeline {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            error: None,
            delay: Duration::ZERO,
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Every invocation fails with a provider error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::answering("")
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Question and history of every invocation, in call order.
    pub fn inputs(&self) -> Vec<(String, Vec<Turn>)> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pipeline for ScriptedPipeline {
    async fn invoke(&self, input: PipelineInput<'_>) -> Result<String, PipelineError> {
        self.inputs
            .lock()
            .unwrap()
            .push((input.question.to_string(), input.history.to_vec()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.error {
            Some(message) => Err(ProviderError::Network(message.clone()).into()),
            None => Ok(self.answer.clone()),
        }
    }
}

/// Everything a [`RecordingChannel`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Typing { chat_id: String, typing: bool },
    Sent { chat_id: String, content: String },
    Cleared { chat_id: String },
}

/// Channel that records outbound calls and serves a canned history.
pub struct RecordingChannel {
    id: ChannelId,
    history: Mutex<Vec<HistoryMessage>>,
    events: Mutex<Vec<ChannelEvent>>,
    history_fetches: Mutex<usize>,
    max_message_bytes: usize,
    first_typing_delay: Duration,
    typed: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self {
            id: ChannelId("recording".into()),
            history: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            history_fetches: Mutex::new(0),
            max_message_bytes: docbot_core::DEFAULT_MAX_MESSAGE_BYTES,
            first_typing_delay: Duration::ZERO,
            typed: AtomicBool::new(false),
        }
    }

    /// Messages the platform already holds for every conversation.
    pub fn with_history(self, history: Vec<HistoryMessage>) -> Self {
        *self.history.lock().unwrap() = history;
        self
    }

    pub fn with_max_message_bytes(mut self, max: usize) -> Self {
        self.max_message_bytes = max;
        self
    }

    /// Stall the first typing-on signal, like a slow transport round trip.
    pub fn with_first_typing_delay(mut self, delay: Duration) -> Self {
        self.first_typing_delay = delay;
        self
    }

    pub fn events(&self) -> Vec<ChannelEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Texts sent to `chat_id`, in order.
    pub fn sent(&self, chat_id: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChannelEvent::Sent { chat_id: c, content } if c == chat_id => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn history_fetches(&self) -> usize {
        *self.history_fetches.lock().unwrap()
    }

    fn record(&self, event: ChannelEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn send(&self, chat_id: &str, content: &str) -> Result<(), ChannelError> {
        self.record(ChannelEvent::Sent {
            chat_id: chat_id.into(),
            content: content.into(),
        });
        Ok(())
    }

    async fn send_typing(&self, chat_id: &str, typing: bool) -> Result<(), ChannelError> {
        let first = typing && !self.typed.swap(true, Ordering::SeqCst);
        if first && !self.first_typing_delay.is_zero() {
            tokio::time::sleep(self.first_typing_delay).await;
        }
        self.record(ChannelEvent::Typing {
            chat_id: chat_id.into(),
            typing,
        });
        Ok(())
    }

    async fn history(
        &self,
        _chat_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, ChannelError> {
        *self.history_fetches.lock().unwrap() += 1;
        let history = self.history.lock().unwrap();
        let start = history.len().saturating_sub(limit);
        Ok(history[start..].to_vec())
    }

    async fn clear_history(&self, chat_id: &str) -> Result<(), ChannelError> {
        self.history.lock().unwrap().clear();
        self.record(ChannelEvent::Cleared { chat_id: chat_id.into() });
        Ok(())
    }

    fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }
}
