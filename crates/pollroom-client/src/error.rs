//! Client and service error types.

use pollroom_core::{ChannelId, MediaError, MessageId};
use thiserror::Error;

/// A collaborator service call failed.
///
/// None of these are fatal. Poll failures are retried by the next tick;
/// mutation failures are surfaced to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Request never produced a response (timeout, connection refused, ...).
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("service returned status {code}")]
    Status {
        /// HTTP status code
        code: u16,
    },

    /// Service answered with an application-level error.
    #[error("{message}")]
    Rejected {
        /// Error message from the service
        message: String,
    },

    /// Session is not allowed to perform the operation.
    #[error("not authorized: {message}")]
    Unauthorized {
        /// Error message from the service
        message: String,
    },

    /// Response did not match the request.
    #[error("unexpected response, expected {expected}")]
    UnexpectedResponse {
        /// Response variant the request expects
        expected: &'static str,
    },

    /// Response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Authorization failures surface as blocking alerts instead of banners.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Status { code: 401 | 403 })
    }
}

/// Errors returned synchronously by [`crate::Client::handle`].
///
/// These are caught before any request leaves the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Operation needs an active channel.
    #[error("no active channel")]
    NoActiveChannel,

    /// Channel is not in the directory.
    #[error("unknown channel {channel_id}")]
    UnknownChannel {
        /// Requested channel
        channel_id: ChannelId,
    },

    /// Message is not in the local view.
    #[error("unknown message {message_id}")]
    UnknownMessage {
        /// Requested message
        message_id: MessageId,
    },

    /// Local user may not perform the operation.
    #[error("not permitted to {action}")]
    NotPermitted {
        /// What was attempted
        action: &'static str,
    },

    /// Channel names must not be blank.
    #[error("channel name is empty")]
    EmptyChannelName,

    /// Payload failed validation.
    #[error(transparent)]
    Validation(#[from] MediaError),
}
