//! In-process test doubles for the stream ports.

use crate::ports::chat_transport::{ByteStream, ChatStreamRequest, ChatTransport, TransportError};
use crate::ports::message_projector::MessageProjector;
use async_trait::async_trait;
use campus_domain::{ChatMessage, ConversationId, MessageId, ModelKey};
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

pub(crate) type ChunkSender = mpsc::UnboundedSender<Result<Vec<u8>, TransportError>>;

enum Scripted {
    Results(Vec<Result<Vec<u8>, TransportError>>),
    Channel(mpsc::UnboundedReceiver<Result<Vec<u8>, TransportError>>),
    OpenError(TransportError),
}

/// Transport that replays queued responses, one per `open` call.
#[derive(Default)]
pub(crate) struct ScriptTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatStreamRequest>>,
    opened: AtomicUsize,
}

impl ScriptTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(self, scripted: Scripted) -> Self {
        self.script.lock().unwrap().push_back(scripted);
        self
    }

    pub(crate) fn with_chunks(self, chunks: Vec<Vec<u8>>) -> Self {
        self.with_results(chunks.into_iter().map(Ok).collect())
    }

    pub(crate) fn with_results(self, results: Vec<Result<Vec<u8>, TransportError>>) -> Self {
        self.push(Scripted::Results(results))
    }

    pub(crate) fn with_open_error(self, error: TransportError) -> Self {
        self.push(Scripted::OpenError(error))
    }

    /// Queue a response whose body stays open until the sender is dropped.
    pub(crate) fn with_channel(self) -> (Self, ChunkSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.push(Scripted::Channel(rx)), tx)
    }

    pub(crate) fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<ChatStreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptTransport {
    async fn open(&self, request: &ChatStreamRequest) -> Result<ByteStream, TransportError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Results(results)) => Ok(futures::stream::iter(results).boxed()),
            Some(Scripted::Channel(rx)) => Ok(futures::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })
            .boxed()),
            Some(Scripted::OpenError(error)) => Err(error),
            None => Err(TransportError::Connection("no scripted response".to_string())),
        }
    }
}

/// Projector that records every call.
pub(crate) struct RecordingProjector {
    appended: Mutex<Vec<(ConversationId, ChatMessage)>>,
    published: Mutex<Vec<(MessageId, String)>>,
    latest: watch::Sender<String>,
}

impl Default for RecordingProjector {
    fn default() -> Self {
        Self {
            appended: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            latest: watch::channel(String::new()).0,
        }
    }
}

impl RecordingProjector {
    pub(crate) fn appended(&self) -> Vec<ChatMessage> {
        self.appended
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub(crate) fn contents(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub(crate) fn contents_for(&self, id: &MessageId) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == id)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub(crate) fn last(&self) -> Option<String> {
        self.contents().pop()
    }

    /// Wait until the most recent publish equals `expected`.
    pub(crate) async fn wait_for(&self, expected: &str) {
        let mut rx = self.latest.subscribe();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|c| c == expected))
            .await
            .expect("timed out waiting for published content")
            .expect("projector dropped");
    }
}

impl MessageProjector for RecordingProjector {
    fn append(&self, conversation_id: &ConversationId, message: ChatMessage) {
        self.appended
            .lock()
            .unwrap()
            .push((conversation_id.clone(), message));
    }

    fn publish(&self, message_id: &MessageId, content: &str) {
        self.published
            .lock()
            .unwrap()
            .push((message_id.clone(), content.to_string()));
        self.latest.send_replace(content.to_string());
    }
}

pub(crate) fn request(message: &str) -> ChatStreamRequest {
    ChatStreamRequest {
        conversation_id: ConversationId::new("conv-1").unwrap(),
        message: message.to_string(),
        model: ModelKey::default(),
        bearer_token: None,
    }
}
