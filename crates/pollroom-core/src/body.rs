//! Media tag codec.
//!
//! The collaborator service stores one opaque text field per message. Non-text
//! payloads ride inside it as a short ASCII tag immediately followed by the
//! content, with no separator:
//!
//! ```text
//! [IMAGE]data:image/png;base64,iVBORw0...
//! [VOICE]data:audio/webm;base64,GkXf...
//! [WATCH]https://video.example/v/42
//! [MEETING]https://meet.example/room
//! ```
//!
//! Anything without a recognized tag is plain text. Text that happens to start
//! with a tag is written behind a `[TEXT]` escape so that decoding is the exact
//! inverse of encoding for every variant.
//!
//! Decoding never sanitizes. Markup stripping is a presentation concern, see
//! [`sanitize_markup`].

use std::{borrow::Cow, sync::LazyLock};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;

use crate::MediaError;

/// Largest image or voice payload accepted by the producers (5 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_TAG: &str = "[IMAGE]";
const VOICE_TAG: &str = "[VOICE]";
const WATCH_TAG: &str = "[WATCH]";
const MEETING_TAG: &str = "[MEETING]";
const TEXT_TAG: &str = "[TEXT]";

/// Recognized tags, longest first.
const TAGS: [(&str, BodyKind); 5] = [
    (MEETING_TAG, BodyKind::MeetingStart),
    (IMAGE_TAG, BodyKind::Image),
    (VOICE_TAG, BodyKind::Voice),
    (WATCH_TAG, BodyKind::WatchLink),
    (TEXT_TAG, BodyKind::Text),
];

/// Payload kind carried by a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Plain text.
    Text,
    /// Image as a data URL.
    Image,
    /// Voice clip as a data URL.
    Voice,
    /// Watch-together link.
    WatchLink,
    /// Meeting announcement carrying the meeting URL.
    MeetingStart,
}

/// Decoded message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Plain text, unsanitized.
    Text(String),
    /// `data:image/...` URL.
    Image(String),
    /// `data:audio/...` URL.
    Voice(String),
    /// Link to watch together.
    WatchLink(String),
    /// A meeting was started at this URL.
    MeetingStart(String),
}

impl Body {
    /// Decode a wire body.
    ///
    /// Tags are matched longest first. Never fails: an untagged body is text.
    pub fn decode(wire: &str) -> Self {
        for (tag, kind) in TAGS {
            if let Some(payload) = wire.strip_prefix(tag) {
                return Self::from_parts(kind, payload.to_string());
            }
        }
        Self::Text(wire.to_string())
    }

    /// Encode into the wire string. Inverse of [`Body::decode`].
    pub fn encode(&self) -> String {
        match self {
            Self::Text(text) if starts_with_tag(text) => format!("{TEXT_TAG}{text}"),
            Self::Text(text) => text.clone(),
            Self::Image(url) => format!("{IMAGE_TAG}{url}"),
            Self::Voice(url) => format!("{VOICE_TAG}{url}"),
            Self::WatchLink(url) => format!("{WATCH_TAG}{url}"),
            Self::MeetingStart(url) => format!("{MEETING_TAG}{url}"),
        }
    }

    /// Build a body from a kind and its raw payload.
    pub fn from_parts(kind: BodyKind, payload: String) -> Self {
        match kind {
            BodyKind::Text => Self::Text(payload),
            BodyKind::Image => Self::Image(payload),
            BodyKind::Voice => Self::Voice(payload),
            BodyKind::WatchLink => Self::WatchLink(payload),
            BodyKind::MeetingStart => Self::MeetingStart(payload),
        }
    }

    /// Payload kind.
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Text(_) => BodyKind::Text,
            Self::Image(_) => BodyKind::Image,
            Self::Voice(_) => BodyKind::Voice,
            Self::WatchLink(_) => BodyKind::WatchLink,
            Self::MeetingStart(_) => BodyKind::MeetingStart,
        }
    }

    /// Raw payload without the tag.
    pub fn payload(&self) -> &str {
        match self {
            Self::Text(s)
            | Self::Image(s)
            | Self::Voice(s)
            | Self::WatchLink(s)
            | Self::MeetingStart(s) => s,
        }
    }

    /// Text to render for this body.
    ///
    /// Text bodies have markup stripped. Other kinds render their payload
    /// unchanged; frontends usually show a placeholder for data URLs instead.
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => sanitize_markup(text),
            other => Cow::Borrowed(other.payload()),
        }
    }

    /// Validated text body.
    ///
    /// # Errors
    ///
    /// - `MediaError::EmptyText` if the input is empty or whitespace only
    pub fn text(input: impl Into<String>) -> Result<Self, MediaError> {
        let text = input.into();
        if text.trim().is_empty() {
            return Err(MediaError::EmptyText);
        }
        Ok(Self::Text(text))
    }

    /// Validated image body from raw bytes.
    ///
    /// # Errors
    ///
    /// - `MediaError::NotAnImage` unless `mime` is `image/*`
    /// - `MediaError::EmptyAttachment` for zero bytes
    /// - `MediaError::TooLarge` above [`MAX_ATTACHMENT_BYTES`]
    pub fn image(mime: &str, bytes: &[u8]) -> Result<Self, MediaError> {
        if !mime.starts_with("image/") {
            return Err(MediaError::NotAnImage { mime: mime.to_string() });
        }
        Self::check_attachment_size(bytes.len())?;
        Ok(Self::Image(data_url(mime, bytes)))
    }

    /// Validated voice body from raw bytes.
    ///
    /// # Errors
    ///
    /// - `MediaError::NotAudio` unless `mime` is `audio/*`
    /// - `MediaError::EmptyAttachment` for zero bytes
    /// - `MediaError::TooLarge` above [`MAX_ATTACHMENT_BYTES`]
    pub fn voice(mime: &str, bytes: &[u8]) -> Result<Self, MediaError> {
        if !mime.starts_with("audio/") {
            return Err(MediaError::NotAudio { mime: mime.to_string() });
        }
        Self::check_attachment_size(bytes.len())?;
        Ok(Self::Voice(data_url(mime, bytes)))
    }

    /// Reject attachments that are empty or over [`MAX_ATTACHMENT_BYTES`].
    ///
    /// Lets callers refuse a file from its metadata before reading it.
    ///
    /// # Errors
    ///
    /// - `MediaError::EmptyAttachment` for zero bytes
    /// - `MediaError::TooLarge` above [`MAX_ATTACHMENT_BYTES`]
    pub fn check_attachment_size(size: usize) -> Result<(), MediaError> {
        if size == 0 {
            return Err(MediaError::EmptyAttachment);
        }
        if size > MAX_ATTACHMENT_BYTES {
            return Err(MediaError::TooLarge { size, max: MAX_ATTACHMENT_BYTES });
        }
        Ok(())
    }

    /// Validated watch-together link.
    ///
    /// # Errors
    ///
    /// - `MediaError::InvalidUrl` unless `url` is an absolute http(s) URL
    pub fn watch_link(url: &str) -> Result<Self, MediaError> {
        validate_link(url).map(Self::WatchLink)
    }

    /// Validated meeting announcement.
    ///
    /// # Errors
    ///
    /// - `MediaError::InvalidUrl` unless `url` is an absolute http(s) URL
    pub fn meeting_start(url: &str) -> Result<Self, MediaError> {
        validate_link(url).map(Self::MeetingStart)
    }
}

/// Any `<...>` run with at least one character between the brackets.
#[allow(clippy::expect_used)]
static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("markup pattern is valid"));

/// Strip every `<...>` substring (at least one character between the
/// brackets). Lightweight XSS guard for rendering text, not an escaper.
pub fn sanitize_markup(text: &str) -> Cow<'_, str> {
    MARKUP.replace_all(text, "")
}

fn starts_with_tag(text: &str) -> bool {
    TAGS.iter().any(|(tag, _)| text.starts_with(tag))
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn validate_link(raw: &str) -> Result<String, MediaError> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| MediaError::InvalidUrl { url: raw.to_string(), reason: e.to_string() })?;

    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim().to_string()),
        other => Err(MediaError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
