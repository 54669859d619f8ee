//! reqwest-backed [`ChatTransport`] talking to the portal chat endpoint.

use super::error::HttpTransportError;
use crate::config::FileApiConfig;
use async_trait::async_trait;
use campus_application::{ByteStream, ChatStreamRequest, ChatTransport, TransportError};
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("campus-chat/", env!("CARGO_PKG_VERSION"));

/// JSON body of a chat request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequestBody<'a> {
    message: &'a str,
    model_key: &'a str,
    /// Backend session id; omitted for conversations the backend has not assigned one
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<i64>,
}

/// Streams chat replies over HTTP.
///
/// Cancellation is handled by the caller dropping the returned future or
/// stream, which aborts the underlying connection.
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpChatTransport {
    pub fn new(config: &FileApiConfig) -> Result<Self, HttpTransportError> {
        let raw = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.stream_path
        );
        let endpoint = reqwest::Url::parse(&raw).map_err(|e| HttpTransportError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    fn map_send_error(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Connection(error.to_string())
        }
    }

    fn map_body_error(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Interrupted(error.to_string())
        }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open(&self, request: &ChatStreamRequest) -> Result<ByteStream, TransportError> {
        let body = ChatRequestBody {
            message: &request.message,
            model_key: request.model.as_str(),
            session_id: request.conversation_id.backend_session_id(),
        };

        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .json(&body);
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        debug!(
            "POST {} (conversation {}, model {})",
            self.endpoint, request.conversation_id, request.model
        );

        let response = builder.send().await.map_err(|e| {
            warn!("Chat request to {} failed: {}", self.endpoint, e);
            Self::map_send_error(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Chat endpoint answered HTTP {}", status.as_u16());
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let stream = response
            .bytes_stream()
            .map(|result| result.map(|bytes| bytes.to_vec()).map_err(Self::map_body_error));

        Ok(Box::pin(stream))
    }
}
