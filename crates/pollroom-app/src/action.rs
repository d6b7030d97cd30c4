//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use std::path::PathBuf;

use pollroom_core::{Body, ChannelId, MessageId};

/// Attachment flavour selected by the command that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// `/image <path>`
    Image,
    /// `/voice <path>`
    Voice,
}

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Join a channel by name.
    Join {
        /// Channel name.
        channel_name: String,
    },

    /// Create a channel.
    CreateChannel {
        /// Channel name.
        name: String,
        /// Initial member names.
        members: Vec<String>,
    },

    /// Delete a channel.
    DeleteChannel {
        /// Channel to delete.
        channel_id: ChannelId,
    },

    /// Switch the active channel.
    SelectChannel {
        /// Channel to activate.
        channel_id: ChannelId,
    },

    /// Post a message to the active channel.
    Send {
        /// Validated body.
        body: Body,
    },

    /// Read a file from disk and post it as an image or voice clip.
    SendAttachment {
        /// Image or voice.
        kind: AttachmentKind,
        /// File to read.
        path: PathBuf,
    },

    /// Delete a message in the active channel.
    DeleteMessage {
        /// Message to delete.
        message_id: MessageId,
    },

    /// Start a meeting in the active channel.
    StartMeeting {
        /// Meeting URL.
        url: String,
    },

    /// The input buffer was edited (typing signal).
    InputChanged,

    /// The viewport moved.
    Scrolled {
        /// Rows between the bottom of the log and the bottom of the viewport.
        distance_from_bottom: u32,
    },

    /// Jump to the newest message and mark everything read.
    JumpToLatest,

    /// Open a URL in an external viewer.
    OpenUrl {
        /// Absolute URL.
        url: String,
    },
}
