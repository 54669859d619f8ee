//! Stream Chat use case.
//!
//! Starts and cancels streamed replies. Each call to
//! [`StreamChatUseCase::start_stream`]:
//!
//! 1. enforces the single-active-stream precondition for the conversation
//!    (reject, or cancel the running stream and wait for it to close)
//! 2. resolves the bearer token through the injected [`CredentialProvider`]
//! 3. appends the user message and an empty assistant placeholder
//! 4. spawns a [`StreamSession`] and returns a [`StreamHandle`]
//!
//! Steps 1-3 happen before any network activity.

use crate::config::{ActiveStreamPolicy, StreamConfig};
use crate::ports::chat_transport::{ChatStreamRequest, ChatTransport};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::credential_provider::{CredentialError, CredentialProvider};
use crate::ports::message_projector::MessageProjector;
use crate::use_cases::stream_session::StreamSession;
use campus_domain::util::truncate_str;
use campus_domain::{ChatMessage, ConversationId, DomainError, MessageId, ModelKey, StreamOutcome};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors that can occur when starting a stream.
///
/// All of them are reported before any network request is issued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartStreamError {
    #[error("A reply is already streaming in conversation {0}")]
    StreamAlreadyActive(ConversationId),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("Credential error: {0}")]
    Credentials(#[from] CredentialError),
}

/// Input for [`StreamChatUseCase::start_stream`].
#[derive(Debug, Clone)]
pub struct StartStreamInput {
    pub conversation_id: ConversationId,
    pub text: String,
    /// Forwarded verbatim to the transport.
    pub model: ModelKey,
}

impl StartStreamInput {
    pub fn new(conversation_id: ConversationId, text: impl Into<String>, model: ModelKey) -> Self {
        Self {
            conversation_id,
            text: text.into(),
            model,
        }
    }
}

/// Handle to one running (or finished) stream.
///
/// Cheap to clone; every clone controls the same session.
#[derive(Clone)]
pub struct StreamHandle {
    id: u64,
    conversation_id: ConversationId,
    user_message_id: MessageId,
    message_id: MessageId,
    cancellation: CancellationToken,
    outcome: watch::Receiver<Option<StreamOutcome>>,
}

impl StreamHandle {
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Id of the user message that triggered this stream.
    pub fn user_message_id(&self) -> &MessageId {
        &self.user_message_id
    }

    /// Id of the assistant message this stream writes to.
    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    /// Request cancellation. Idempotent; a no-op once the stream has closed.
    pub fn cancel(&self) {
        if !self.is_closed() {
            self.cancellation.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// Wait for the stream to close and return its outcome.
    pub async fn outcome(&self) -> StreamOutcome {
        let mut rx = self.outcome.clone();
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome
                .clone()
                .unwrap_or_else(|| StreamOutcome::failed("", "stream task ended unexpectedly")),
            Err(_) => StreamOutcome::failed("", "stream task ended unexpectedly"),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("id", &self.id)
            .field("conversation_id", &self.conversation_id)
            .field("message_id", &self.message_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Registry entry for a conversation's running stream.
struct ActiveStream {
    handle_id: u64,
    cancellation: CancellationToken,
    outcome: watch::Receiver<Option<StreamOutcome>>,
}

type Registry = Arc<Mutex<HashMap<ConversationId, ActiveStream>>>;

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<ConversationId, ActiveStream>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Use case for streaming an assistant reply into a conversation.
pub struct StreamChatUseCase {
    transport: Arc<dyn ChatTransport>,
    projector: Arc<dyn MessageProjector>,
    credentials: Arc<dyn CredentialProvider>,
    conversation_logger: Arc<dyn ConversationLogger>,
    config: StreamConfig,
    active: Registry,
    next_id: AtomicU64,
}

impl StreamChatUseCase {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        projector: Arc<dyn MessageProjector>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            transport,
            projector,
            credentials,
            conversation_logger: Arc::new(NoConversationLogger),
            config: StreamConfig::default(),
            active: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Whether a reply is currently streaming in `conversation_id`.
    pub fn is_streaming(&self, conversation_id: &ConversationId) -> bool {
        lock(&self.active).contains_key(conversation_id)
    }

    /// Cancel a stream through its handle. Idempotent.
    pub fn cancel(&self, handle: &StreamHandle) {
        handle.cancel();
    }

    /// Cancel whatever is streaming in `conversation_id`.
    ///
    /// Returns `false` if nothing was active.
    pub fn cancel_conversation(&self, conversation_id: &ConversationId) -> bool {
        match lock(&self.active).get(conversation_id) {
            Some(active) => {
                active.cancellation.cancel();
                true
            }
            None => false,
        }
    }

    /// Start streaming a reply to `input.text`.
    pub async fn start_stream(
        &self,
        input: StartStreamInput,
    ) -> Result<StreamHandle, StartStreamError> {
        if input.text.trim().is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }

        let handle_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancellation = CancellationToken::new();
        let (outcome_tx, outcome_rx) = watch::channel(None);

        self.reserve(&input.conversation_id, handle_id, &cancellation, &outcome_rx)
            .await?;

        let bearer_token = match self.credentials.bearer_token().await {
            Ok(token) => token,
            Err(e) => {
                self.release(&input.conversation_id, handle_id);
                return Err(e.into());
            }
        };

        let user_message_id = self.message_id(handle_id, "u");
        let message_id = self.message_id(handle_id, "a");
        self.projector.append(
            &input.conversation_id,
            ChatMessage::user(user_message_id.clone(), input.text.clone()),
        );
        self.projector.append(
            &input.conversation_id,
            ChatMessage::assistant_placeholder(message_id.clone(), input.model.clone()),
        );

        info!(
            "Starting stream in conversation {} with model {}: {}",
            input.conversation_id,
            input.model,
            truncate_str(&input.text, 100)
        );
        self.conversation_logger.log(ConversationEvent::new(
            "stream_started",
            serde_json::json!({
                "conversation_id": input.conversation_id.as_str(),
                "message_id": message_id.as_str(),
                "model": input.model.as_str(),
            }),
        ));

        let request = ChatStreamRequest {
            conversation_id: input.conversation_id.clone(),
            message: input.text,
            model: input.model,
            bearer_token,
        };
        let mut session = StreamSession::new(message_id.clone(), self.projector.clone())
            .with_error_label(self.config.error_label.clone());

        let transport = self.transport.clone();
        let registry = self.active.clone();
        let logger = self.conversation_logger.clone();
        let task_cancellation = cancellation.clone();
        let conversation_id = input.conversation_id.clone();
        let task_message_id = message_id.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = session
                .run(transport.as_ref(), &request, &task_cancellation)
                .await;

            {
                let mut active = lock(&registry);
                if active
                    .get(&conversation_id)
                    .is_some_and(|a| a.handle_id == handle_id)
                {
                    active.remove(&conversation_id);
                }
            }

            info!(
                "Stream in conversation {} {} ({} bytes)",
                conversation_id,
                outcome.kind(),
                outcome.text().len()
            );
            let mut payload = serde_json::json!({
                "conversation_id": conversation_id.as_str(),
                "message_id": task_message_id.as_str(),
                "outcome": outcome.kind(),
                "bytes": outcome.text().len(),
                "duration_ms": started.elapsed().as_millis() as u64,
            });
            if let StreamOutcome::Failed { reason, .. } = &outcome {
                payload["reason"] = serde_json::json!(reason);
            }
            logger.log(ConversationEvent::new("stream_finished", payload));

            let _ = outcome_tx.send(Some(outcome));
        });

        Ok(StreamHandle {
            id: handle_id,
            conversation_id: input.conversation_id,
            user_message_id,
            message_id,
            cancellation,
            outcome: outcome_rx,
        })
    }

    /// Claim the conversation's stream slot according to the policy.
    async fn reserve(
        &self,
        conversation_id: &ConversationId,
        handle_id: u64,
        cancellation: &CancellationToken,
        outcome: &watch::Receiver<Option<StreamOutcome>>,
    ) -> Result<(), StartStreamError> {
        loop {
            let mut previous = {
                let mut active = lock(&self.active);
                let running = active
                    .get(conversation_id)
                    .map(|a| (a.cancellation.clone(), a.outcome.clone()));
                match running {
                    None => {
                        active.insert(
                            conversation_id.clone(),
                            ActiveStream {
                                handle_id,
                                cancellation: cancellation.clone(),
                                outcome: outcome.clone(),
                            },
                        );
                        return Ok(());
                    }
                    Some((running_cancellation, running_outcome)) => {
                        match self.config.active_stream_policy {
                            ActiveStreamPolicy::Reject => {
                                debug!(
                                    "Rejecting send: conversation {} is streaming",
                                    conversation_id
                                );
                                return Err(StartStreamError::StreamAlreadyActive(
                                    conversation_id.clone(),
                                ));
                            }
                            ActiveStreamPolicy::CancelPrevious => {
                                running_cancellation.cancel();
                                running_outcome
                            }
                        }
                    }
                }
            };

            debug!(
                "Cancelling previous stream in conversation {} before starting a new one",
                conversation_id
            );
            // The previous task deregisters itself before publishing its outcome
            let _ = previous.wait_for(Option::is_some).await;
        }
    }

    fn release(&self, conversation_id: &ConversationId, handle_id: u64) {
        let mut active = lock(&self.active);
        if active
            .get(conversation_id)
            .is_some_and(|a| a.handle_id == handle_id)
        {
            active.remove(conversation_id);
        }
    }

    fn message_id(&self, handle_id: u64, role: &str) -> MessageId {
        MessageId::new(format!(
            "{}-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            handle_id,
            role
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::credential_provider::NoCredentials;
    use crate::use_cases::test_support::{RecordingProjector, ScriptTransport};
    use async_trait::async_trait;
    use campus_domain::Sender;
    use std::time::Duration;

    struct StaticToken(&'static str);

    #[async_trait]
    impl CredentialProvider for StaticToken {
        async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
            Ok(Some(self.0.to_string()))
        }
    }

    struct BrokenCredentials;

    #[async_trait]
    impl CredentialProvider for BrokenCredentials {
        async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
            Err(CredentialError::Unavailable("token file missing".to_string()))
        }
    }

    fn conversation() -> ConversationId {
        ConversationId::new("conv-1").unwrap()
    }

    fn input(text: &str) -> StartStreamInput {
        StartStreamInput::new(conversation(), text, ModelKey::Deepseek)
    }

    fn use_case(
        transport: &Arc<ScriptTransport>,
        projector: &Arc<RecordingProjector>,
    ) -> StreamChatUseCase {
        StreamChatUseCase::new(transport.clone(), projector.clone(), Arc::new(NoCredentials))
    }

    #[tokio::test]
    async fn test_placeholder_published_before_stream_and_completed() {
        let transport = Arc::new(ScriptTransport::new().with_chunks(vec![
            b"data: {\"textResponse\":\"Hi\"}\n".to_vec(),
        ]));
        let projector = Arc::new(RecordingProjector::default());
        let use_case = use_case(&transport, &projector);

        let handle = use_case.start_stream(input("Hello?")).await.unwrap();

        let appended = projector.appended();
        assert_eq!(appended.len(), 2);
        assert_eq!(appended[0].sender, Sender::User);
        assert_eq!(appended[0].content, "Hello?");
        assert_eq!(appended[1].sender, Sender::Assistant);
        assert_eq!(appended[1].id, *handle.message_id());
        assert!(appended[1].content.is_empty());
        assert_eq!(appended[1].model_tag, Some(ModelKey::Deepseek));

        assert_eq!(handle.outcome().await, StreamOutcome::completed("Hi"));
        assert!(handle.is_closed());
        assert_eq!(projector.contents_for(handle.message_id()), vec!["Hi", "Hi"]);
        assert!(!use_case.is_streaming(&conversation()));
    }

    #[tokio::test]
    async fn test_request_carries_model_and_resolved_token() {
        let transport = Arc::new(ScriptTransport::new().with_chunks(vec![]));
        let projector = Arc::new(RecordingProjector::default());
        let use_case = StreamChatUseCase::new(
            transport.clone(),
            projector.clone(),
            Arc::new(StaticToken("tok-123")),
        );

        let handle = use_case.start_stream(input("Hello?")).await.unwrap();
        handle.outcome().await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, ModelKey::Deepseek);
        assert_eq!(requests[0].message, "Hello?");
        assert_eq!(requests[0].bearer_token.as_deref(), Some("tok-123"));
    }

    #[tokio::test]
    async fn test_empty_message_rejected_before_network() {
        let transport = Arc::new(ScriptTransport::new());
        let projector = Arc::new(RecordingProjector::default());
        let use_case = use_case(&transport, &projector);

        let err = use_case.start_stream(input("   ")).await.unwrap_err();

        assert_eq!(err, StartStreamError::InvalidInput(DomainError::EmptyMessage));
        assert!(projector.appended().is_empty());
        assert_eq!(transport.open_count(), 0);
    }

    #[tokio::test]
    async fn test_credential_failure_rejected_and_slot_released() {
        let transport = Arc::new(ScriptTransport::new());
        let projector = Arc::new(RecordingProjector::default());
        let use_case = StreamChatUseCase::new(
            transport.clone(),
            projector.clone(),
            Arc::new(BrokenCredentials),
        );

        let err = use_case.start_stream(input("Hello?")).await.unwrap_err();

        assert!(matches!(err, StartStreamError::Credentials(_)));
        assert!(!use_case.is_streaming(&conversation()));
        assert!(projector.appended().is_empty());
        assert_eq!(transport.open_count(), 0);
    }

    #[tokio::test]
    async fn test_second_send_rejected_while_streaming() {
        let (transport, sender) = ScriptTransport::new().with_channel();
        let transport = Arc::new(transport);
        let projector = Arc::new(RecordingProjector::default());
        let use_case = use_case(&transport, &projector);

        let first = use_case.start_stream(input("first")).await.unwrap();
        assert!(use_case.is_streaming(&conversation()));

        let err = use_case.start_stream(input("second")).await.unwrap_err();
        assert_eq!(err, StartStreamError::StreamAlreadyActive(conversation()));
        // Only the first exchange reached the message list
        assert_eq!(projector.appended().len(), 2);

        sender.send(Ok(b"data:done\n".to_vec())).unwrap();
        drop(sender);
        assert_eq!(first.outcome().await, StreamOutcome::completed("done"));
        assert!(!use_case.is_streaming(&conversation()));
    }

    #[tokio::test]
    async fn test_other_conversations_are_independent() {
        let (transport, _sender) = ScriptTransport::new().with_channel();
        let transport = Arc::new(transport.with_chunks(vec![b"data:other\n".to_vec()]));
        let projector = Arc::new(RecordingProjector::default());
        let use_case = use_case(&transport, &projector);

        let _first = use_case.start_stream(input("first")).await.unwrap();
        let other = StartStreamInput::new(
            ConversationId::new("conv-2").unwrap(),
            "second",
            ModelKey::QwenPublic,
        );
        let second = use_case.start_stream(other).await.unwrap();

        assert_eq!(second.outcome().await, StreamOutcome::completed("other"));
    }

    #[tokio::test]
    async fn test_cancel_previous_policy_closes_first_stream() {
        let (transport, sender) = ScriptTransport::new().with_channel();
        let transport = Arc::new(transport.with_chunks(vec![b"data:second reply\n".to_vec()]));
        let projector = Arc::new(RecordingProjector::default());
        let use_case = use_case(&transport, &projector).with_config(
            StreamConfig::default().with_active_stream_policy(ActiveStreamPolicy::CancelPrevious),
        );

        let first = use_case.start_stream(input("first")).await.unwrap();
        sender.send(Ok(b"data:partial\n".to_vec())).unwrap();
        projector.wait_for("partial").await;

        let second = use_case.start_stream(input("second")).await.unwrap();

        // The first stream closed before the second was set up
        assert!(first.is_closed());
        assert_eq!(first.outcome().await, StreamOutcome::cancelled("partial"));
        assert_eq!(
            projector.contents_for(first.message_id()).last().map(String::as_str),
            Some("partial")
        );
        assert_eq!(
            second.outcome().await,
            StreamOutcome::completed("second reply")
        );
        assert_ne!(first.message_id(), second.message_id());
    }

    #[tokio::test]
    async fn test_cancel_via_handle_keeps_partial_text() {
        let (transport, sender) = ScriptTransport::new().with_channel();
        let transport = Arc::new(transport);
        let projector = Arc::new(RecordingProjector::default());
        let use_case = use_case(&transport, &projector);

        let handle = use_case.start_stream(input("hi")).await.unwrap();
        sender.send(Ok(b"data:Hel\n".to_vec())).unwrap();
        sender.send(Ok(b"data:lo\n".to_vec())).unwrap();
        projector.wait_for("Hello").await;

        use_case.cancel(&handle);
        let outcome = tokio::time::timeout(Duration::from_secs(1), handle.outcome())
            .await
            .unwrap();

        assert_eq!(outcome, StreamOutcome::cancelled("Hello"));
        assert_eq!(projector.last(), Some("Hello".to_string()));

        // Idempotent on a closed handle
        handle.cancel();
        use_case.cancel(&handle);
        assert_eq!(handle.outcome().await, StreamOutcome::cancelled("Hello"));
    }

    #[tokio::test]
    async fn test_cancel_conversation() {
        let (transport, _sender) = ScriptTransport::new().with_channel();
        let transport = Arc::new(transport);
        let projector = Arc::new(RecordingProjector::default());
        let use_case = use_case(&transport, &projector);

        assert!(!use_case.cancel_conversation(&conversation()));
        let handle = use_case.start_stream(input("hi")).await.unwrap();
        assert!(use_case.cancel_conversation(&conversation()));

        assert!(handle.outcome().await.is_cancelled());
    }

    #[tokio::test]
    async fn test_failed_stream_gets_configured_annotation() {
        let transport = Arc::new(
            ScriptTransport::new().with_open_error(
                crate::ports::chat_transport::TransportError::Status { status: 401 },
            ),
        );
        let projector = Arc::new(RecordingProjector::default());
        let use_case = use_case(&transport, &projector)
            .with_config(StreamConfig::default().with_error_label("Error"));

        let handle = use_case.start_stream(input("hi")).await.unwrap();

        assert!(handle.outcome().await.is_failed());
        assert_eq!(
            projector.last(),
            Some("\n\n[Error: connection failed (HTTP 401)]".to_string())
        );
    }
}
