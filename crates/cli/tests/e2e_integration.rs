//! End-to-end tests for DocBot.
//!
//! These exercise the full path from an inbound chat message to the replies
//! on the transport: command handling, markdown loading, embedding retrieval,
//! both LLM calls, history and chunked dispatch.

use std::sync::{Arc, Mutex};

use docbot_agent::{ContextAssembler, DocBot, RagPipeline};
use docbot_channels::{CLI_CHAT_ID, CliChannel};
use docbot_config::BotConfig;
use docbot_core::channel::{Channel, ChannelId, ChannelMessage};
use docbot_core::error::{ChannelError, ProviderError};
use docbot_core::history::HistoryMessage;
use docbot_core::message::{Message, MessageRole};
use docbot_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse,
};
use docbot_core::retriever::Retriever;
use docbot_knowledge::{EmbeddingIndex, NoopRetriever, load_markdown_dir};
use tokio::sync::mpsc;

// ── Mock Provider ────────────────────────────────────────────────────────

const VOCAB: [&str; 4] = ["bubble", "call", "message", "presence"];

/// Scripted chat completions plus keyword-count embeddings.
struct ScriptedProvider {
    responses: Vec<String>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|r| r.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        requests.push(request);
        let text = self
            .responses
            .get(call)
            .unwrap_or_else(|| panic!("ScriptedProvider: no response for call #{call}"));
        Ok(ProviderResponse {
            message: Message::assistant(text.as_str()),
            usage: None,
            model: "e2e-model".into(),
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        let embeddings = request
            .inputs
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                VOCAB.iter().map(|w| lower.matches(w).count() as f32).collect()
            })
            .collect();
        Ok(EmbeddingResponse {
            embeddings,
            model: request.model,
        })
    }
}

// ── Recording transport ──────────────────────────────────────────────────

struct RecordingChannel {
    id: ChannelId,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingChannel {
    fn new() -> Self {
        Self {
            id: ChannelId("e2e".into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self, chat_id: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "e2e"
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
        self.sent.lock().unwrap().push((chat_id.into(), content.into()));
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn inbound(chat_id: &str, content: &str) -> ChannelMessage {
    ChannelMessage {
        channel_id: ChannelId("e2e".into()),
        sender_id: "user".into(),
        content: content.into(),
        chat_id: chat_id.into(),
    }
}

fn write_docs(dir: &std::path::Path) {
    std::fs::create_dir_all(dir.join("guides")).unwrap();
    std::fs::write(
        dir.join("guides/bubbles.md"),
        "# Bubbles\n\nA bubble is a group conversation. Create a bubble with createBubble(name).",
    )
    .unwrap();
    std::fs::write(
        dir.join("guides/calls.md"),
        "# Calls\n\nStart an audio call with makeCall(contact).",
    )
    .unwrap();
    std::fs::write(
        dir.join("presence.md"),
        "# Presence\n\nSet your presence with setPresenceTo(status).",
    )
    .unwrap();
}

async fn indexed_retriever(
    provider: Arc<ScriptedProvider>) -> (tempfile::TempDir, Arc<EmbeddingIndex>,
) {
    let dir = tempfile::tempdir().unwrap();
    write_docs(dir.path());
    let documents = load_markdown_dir(dir.path(), 1000, 100).unwrap();
    let index = EmbeddingIndex::new("docs", provider, "e2e-embed").with_min_score(0.1);
    index.add_documents(documents).await.unwrap();
    (dir, Arc::new(index))
}

fn rag(provider: Arc<ScriptedProvider>, retriever: Arc<dyn Retriever>) -> Arc<RagPipeline> {
    Arc::new(
        RagPipeline::new(provider, retriever, "e2e-model")
            .with_top_k(1)
            .with_assembler(ContextAssembler::new("RainBot", "the Rainbow Web SDK")),
    )
}

// ═══════════════════════════════════════════════════════════════════════
// RAG flow
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn e2e_question_answered_from_documentation() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "How do I create a bubble?",
        "Call createBubble(name).\n\n\nIt returns the new bubble.",
    ]));
    let (_dir, index) = indexed_retriever(provider.clone()).await;
    assert_eq!(index.len().await, 3);

    let channel = Arc::new(RecordingChannel::new());
    let bot = DocBot::new(
        "RainBot",
        channel.clone(),
        rag(provider.clone(), index),
        BotConfig::default(),
    );

    bot.handle_message(inbound("conv-1", "How do I create a bubble?")).await;

    assert_eq!(
        channel.sent("conv-1"),
        vec!["Call createBubble(name).\nIt returns the new bubble."]
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let answer_system = &requests[1].messages[0];
    assert_eq!(answer_system.role, MessageRole::System);
    assert!(answer_system.content.contains("named RainBot"));
    assert!(answer_system.content.contains("createBubble(name)"));
    assert!(!answer_system.content.contains("makeCall"));
}

#[tokio::test]
async fn e2e_follow_up_uses_history() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "How do I create a bubble?",
        "Call createBubble(name).",
        "How do I start a call in a bubble?",
        "Use makeCall(contact).",
    ]));
    let (_dir, index) = indexed_retriever(provider.clone()).await;
    let channel = Arc::new(RecordingChannel::new());
    let bot = DocBot::new(
        "RainBot",
        channel.clone(),
        rag(provider.clone(), index),
        BotConfig::default(),
    );

    bot.handle_message(inbound("conv-1", "How do I create a bubble?")).await;
    bot.handle_message(inbound("conv-1", "and a call in it?")).await;

    let requests = provider.requests();
    assert_eq!(requests.len(), 4);

    // Second contextualize call carries the first exchange
    let contextualize = &requests[2].messages;
    assert_eq!(contextualize.len(), 4);
    assert_eq!(contextualize[1].content, "How do I create a bubble?");
    assert_eq!(contextualize[2].content, "Call createBubble(name).");
    assert_eq!(contextualize[3].content, "and a call in it?");

    // The original question, not the standalone one, is answered
    assert_eq!(requests[3].messages.last().unwrap().content, "and a call in it?");
    assert_eq!(channel.sent("conv-1").len(), 2);
}

#[tokio::test]
async fn e2e_long_answer_is_chunked() {
    let lines: Vec<String> = (0..200).map(|i| format!("{i:03}{}", "y".repeat(96))).collect();
    let answer = lines.join("\n");
    assert_eq!(answer.len() + 1, 20000);

    let provider = Arc::new(ScriptedProvider::new(&["q", answer.as_str()]));
    let channel = Arc::new(RecordingChannel::new());
    let bot = DocBot::new(
        "RainBot",
        channel.clone(),
        rag(provider, Arc::new(NoopRetriever)),
        BotConfig::default(),
    );

    bot.handle_message(inbound("conv-1", "dump everything")).await;

    let sent = channel.sent("conv-1");
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|chunk| chunk.len() <= 8192));
    assert!(sent[0].starts_with("000"));
    assert!(sent[2].ends_with(&"y".repeat(96)));
    assert_eq!(sent.join("\n"), answer);
}

// ═══════════════════════════════════════════════════════════════════════
// Commands over the CLI transport
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn e2e_cli_transcript_backs_history() {
    let provider = Arc::new(ScriptedProvider::new(&["q1", "first answer", "q2", "second answer"]));
    let channel = Arc::new(CliChannel::new().with_assistant_name("RainBot"));
    let bot = DocBot::new(
        "RainBot",
        channel.clone(),
        rag(provider.clone(), Arc::new(NoopRetriever)),
        BotConfig::default(),
    );

    // An earlier session left a transcript behind
    channel.record_inbound("What is Rainbow?").await;
    channel.send(CLI_CHAT_ID, "A communication platform.").await.unwrap();

    channel.record_inbound("What is a bubble?").await;
    bot.handle_message(inbound(CLI_CHAT_ID, "What is a bubble?")).await;

    let contextualize = &provider.requests()[0].messages;
    let replayed: Vec<&str> = contextualize.iter().skip(1).map(|m| m.content.as_str()).collect();
    assert_eq!(
        replayed,
        vec!["What is Rainbow?", "A communication platform.", "What is a bubble?"]
    );

    let transcript = channel.history(CLI_CHAT_ID, 10).await.unwrap();
    assert_eq!(transcript.last(), Some(&HistoryMessage::new("first answer", "R")));

    bot.handle_message(inbound(CLI_CHAT_ID, "#obliviate")).await;
    // Only the confirmation is left in the transcript
    assert_eq!(channel.transcript_len().await, 1);
    assert!(bot.history_snapshot(CLI_CHAT_ID).await.is_empty());

    channel.record_inbound("next").await;
    bot.handle_message(inbound(CLI_CHAT_ID, "next")).await;
    let contextualize = &provider.requests()[2].messages;
    // system, the confirmation reply, question
    assert_eq!(contextualize.len(), 3);
    assert_eq!(contextualize[1].role, MessageRole::Assistant);
}

#[tokio::test]
async fn e2e_commands_never_reach_the_model() {
    let provider = Arc::new(ScriptedProvider::new(&[]));
    let channel = Arc::new(RecordingChannel::new());
    let bot = DocBot::new(
        "RainBot",
        channel.clone(),
        rag(provider.clone(), Arc::new(NoopRetriever)),
        BotConfig::default(),
    );

    for command in ["#help", "#debug", "#help", "#debug", "#nope"] {
        bot.handle_message(inbound("conv-1", command)).await;
    }

    let sent = channel.sent("conv-1");
    assert_eq!(sent.len(), 5);
    assert!(sent[0].ends_with("Debug mode is disabled"));
    assert_eq!(sent[1], "**Debug mode is activated**");
    assert!(sent[2].ends_with("Debug mode is activated"));
    assert_eq!(sent[3], "**Debug mode is disabled**");
    assert!(sent[4].starts_with("Sorry #nope is not a command"));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn e2e_run_loop_answers_queued_messages() {
    let provider = Arc::new(ScriptedProvider::new(&["q", "pong"]));
    let channel = Arc::new(RecordingChannel::new());
    let bot = Arc::new(DocBot::new(
        "RainBot",
        channel.clone(),
        rag(provider, Arc::new(NoopRetriever)),
        BotConfig::default(),
    ));

    let (tx, rx) = mpsc::channel(4);
    tx.send(Ok(inbound("conv-1", "#help"))).await.unwrap();
    tx.send(Ok(inbound("conv-2", "ping"))).await.unwrap();
    drop(tx);

    bot.run(rx).await.unwrap();

    assert_eq!(channel.sent("conv-1").len(), 1);
    assert_eq!(channel.sent("conv-2"), vec!["pong"]);
}
