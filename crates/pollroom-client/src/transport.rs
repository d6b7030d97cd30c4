//! HTTP/JSON transport for the client.
//!
//! Provides [`HttpService`], a [`ChatService`] that POSTs one JSON object per
//! operation to the collaborator service. This is a thin layer: it attaches
//! the session id, maps the response envelope to [`Response`] or
//! [`ServiceError`], and nothing else. Retry policy lives in the poll
//! schedule of the Sans-IO [`crate::Client`].
//!
//! Envelope accepted from the service:
//!
//! ```text
//! {"result": {...}}                                   success
//! {"error": "Invalid session"}                        failure
//! {"error": {"message": "...", "data": {"message": "..."}}}
//! ```
//!
//! A body without `result` or `error` is treated as the result itself.

use std::time::Duration;

use pollroom_core::{Channel, ChannelId, MessagePage, PresenceSnapshot};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{ChatService, Request, Response, ServiceError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Collaborator service over HTTP.
///
/// Clone is cheap; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct HttpService {
    http: reqwest::Client,
    base_url: String,
    session_id: Option<String>,
}

impl HttpService {
    /// Service rooted at `base_url` (for example `http://localhost:8069`).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Network` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        session_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url, session_id })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, request: &Request) -> Result<(u16, Vec<u8>), ServiceError> {
        let url = format!("{}{}", self.base_url, endpoint(request));
        let body = request_body(request, self.session_id.as_deref());

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| ServiceError::Network(e.to_string()))?;
        Ok((status, bytes.to_vec()))
    }
}

impl ChatService for HttpService {
    async fn call(&self, request: Request) -> Result<Response, ServiceError> {
        let (status, body) = self.post(&request).await?;
        let result = decode_response(&request, status, &body);
        if let Err(e) = &result {
            tracing::debug!(request = request.name(), status, error = %e, "request failed");
        }
        result
    }
}

fn endpoint(request: &Request) -> &'static str {
    match request {
        Request::Join { .. } => "/api/chat/join",
        Request::ListChannels => "/api/chat/channels",
        Request::CreateChannel { .. } => "/api/chat/channel/create",
        Request::DeleteChannel { .. } => "/api/chat/channel/delete",
        Request::ListMessages { .. } => "/api/chat/messages",
        Request::PostMessage { .. } => "/api/chat/post",
        Request::DeleteMessage { .. } => "/api/chat/message/delete",
        Request::SetTyping { .. } => "/api/chat/typing",
        Request::GetPresence { .. } => "/api/chat/presence",
        Request::StartMeeting { .. } => "/api/chat/meeting/start",
    }
}

fn request_body(request: &Request, session_id: Option<&str>) -> Value {
    match request {
        Request::Join { channel_name } => json!({ "channel_name": channel_name }),
        Request::ListChannels => json!({ "session_id": session_id }),
        Request::CreateChannel { name, members } => {
            json!({ "name": name, "members": members, "session_id": session_id })
        },
        Request::DeleteChannel { channel_id } => {
            json!({ "channel_id": channel_id, "session_id": session_id })
        },
        Request::ListMessages { channel_id } => {
            json!({ "channel_id": channel_id, "session_id": session_id })
        },
        Request::PostMessage { channel_id, body } => {
            json!({ "channel_id": channel_id, "body": body, "session_id": session_id })
        },
        Request::DeleteMessage { channel_id, message_id } => {
            json!({ "channel_id": channel_id, "message_id": message_id, "session_id": session_id })
        },
        Request::SetTyping { channel_id, is_typing } => {
            json!({ "channel_id": channel_id, "is_typing": is_typing, "session_id": session_id })
        },
        Request::GetPresence { channel_id } => {
            json!({ "session_id": session_id, "channel_id": channel_id })
        },
        Request::StartMeeting { channel_id, url } => {
            json!({ "channel_id": channel_id, "url": url, "session_id": session_id })
        },
    }
}

#[derive(Deserialize)]
struct Joined {
    channel_id: ChannelId,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct Created {
    #[serde(alias = "id")]
    channel_id: ChannelId,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChannelList {
    Bare(Vec<Channel>),
    Wrapped { channels: Vec<Channel> },
}

/// An `error` member only signals failure when it carries something.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Map an HTTP status and body to a typed result.
fn decode_response(request: &Request, status: u16, body: &[u8]) -> Result<Response, ServiceError> {
    let envelope: Option<Value> = serde_json::from_slice(body).ok();
    let error_message =
        envelope.as_ref().and_then(|v| v.get("error")).filter(|e| is_set(e)).map(error_text);

    if status == 401 || status == 403 {
        let message = error_message.unwrap_or_else(|| format!("status {status}"));
        return Err(ServiceError::Unauthorized { message });
    }
    if let Some(message) = error_message {
        return Err(ServiceError::Rejected { message });
    }
    if !(200..300).contains(&status) {
        return Err(ServiceError::Status { code: status });
    }

    let envelope = envelope.ok_or_else(|| ServiceError::Decode("body is not JSON".to_string()))?;
    let result = match envelope {
        Value::Object(mut map) if map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        },
        other => other,
    };

    match request {
        Request::Join { .. } => {
            let joined: Joined = from_value(result)?;
            Ok(Response::Joined { channel_id: joined.channel_id, name: joined.name })
        },
        Request::ListChannels => match from_value(result)? {
            ChannelList::Bare(channels) | ChannelList::Wrapped { channels } => {
                Ok(Response::Channels(channels))
            },
        },
        Request::CreateChannel { .. } => {
            let created: Created = from_value(result)?;
            Ok(Response::ChannelCreated { channel_id: created.channel_id })
        },
        Request::ListMessages { .. } => {
            let page: MessagePage = from_value(result)?;
            Ok(Response::Messages(page))
        },
        Request::GetPresence { .. } => {
            let snapshot: PresenceSnapshot = from_value(result)?;
            Ok(Response::Presence(snapshot))
        },
        Request::DeleteChannel { .. }
        | Request::PostMessage { .. }
        | Request::DeleteMessage { .. }
        | Request::SetTyping { .. }
        | Request::StartMeeting { .. } => Ok(Response::Ack),
    }
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ServiceError> {
    serde_json::from_value(value).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Most specific message in an error value.
fn error_text(error: &Value) -> String {
    let nested = error.pointer("/data/message").and_then(Value::as_str);
    let flat = error.get("message").and_then(Value::as_str);
    match (error.as_str(), nested, flat) {
        (Some(text), _, _) | (None, Some(text), _) | (None, None, Some(text)) => text.to_string(),
        (None, None, None) => "Unknown Error".to_string(),
    }
}
