//! Error types for the Pollroom core.
//!
//! Validation failures raised by media producers before anything is sent to
//! the collaborator service.

use thiserror::Error;

/// A payload was rejected before encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Text input was empty or whitespace only.
    #[error("message is empty")]
    EmptyText,

    /// Image payload with a non-image MIME type.
    #[error("not an image: {mime}")]
    NotAnImage {
        /// MIME type that was offered
        mime: String,
    },

    /// Voice payload with a non-audio MIME type.
    #[error("not an audio clip: {mime}")]
    NotAudio {
        /// MIME type that was offered
        mime: String,
    },

    /// Attachment contained no data.
    #[error("attachment is empty")]
    EmptyAttachment,

    /// Attachment exceeds the size limit.
    #[error("attachment too large: {size} bytes (max {max})")]
    TooLarge {
        /// Size of the offered payload in bytes
        size: usize,
        /// Maximum accepted size in bytes
        max: usize,
    },

    /// Link is not an absolute http(s) URL.
    #[error("invalid link {url:?}: {reason}")]
    InvalidUrl {
        /// Offered link
        url: String,
        /// Why it was rejected
        reason: String,
    },
}
