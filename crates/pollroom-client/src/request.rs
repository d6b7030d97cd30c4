//! Requests to and responses from the collaborator service.
//!
//! One variant per service operation. The session credential is not part of
//! the request; the [`crate::ChatService`] implementation attaches it.

use pollroom_core::{Channel, ChannelId, MessageId, MessagePage, PresenceSnapshot};

/// Locally assigned request sequence number. Strictly increasing per client.
pub type RequestId = u64;

/// Identity of an in-flight request.
///
/// Every request remembers which channel was active when it was issued so a
/// late response can be recognized and discarded after a channel switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTag {
    /// Sequence number.
    pub id: RequestId,
    /// Channel the request was issued against. `None` for channel-less calls.
    pub channel_id: Option<ChannelId>,
}

/// A collaborator service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Join (or resolve) a channel by name.
    Join {
        /// Channel name.
        channel_name: String,
    },

    /// List joined channels with admin flags.
    ListChannels,

    /// Create a channel.
    CreateChannel {
        /// Channel name.
        name: String,
        /// Initial member names.
        members: Vec<String>,
    },

    /// Delete a channel (admin only).
    DeleteChannel {
        /// Channel to delete.
        channel_id: ChannelId,
    },

    /// Fetch the current message window and typing set.
    ListMessages {
        /// Channel to read.
        channel_id: ChannelId,
    },

    /// Post a wire-encoded body.
    PostMessage {
        /// Target channel.
        channel_id: ChannelId,
        /// Tag-prefixed body.
        body: String,
    },

    /// Delete a message (author or channel admin).
    DeleteMessage {
        /// Owning channel.
        channel_id: ChannelId,
        /// Message to delete.
        message_id: MessageId,
    },

    /// Report typing state. Fire-and-forget.
    SetTyping {
        /// Channel being typed in.
        channel_id: ChannelId,
        /// Typing on or off.
        is_typing: bool,
    },

    /// Fetch online names and the active meeting.
    GetPresence {
        /// Channel to inspect.
        channel_id: ChannelId,
    },

    /// Register a meeting for a channel.
    StartMeeting {
        /// Channel hosting the meeting.
        channel_id: ChannelId,
        /// Meeting URL.
        url: String,
    },
}

impl Request {
    /// Channel this request targets. `None` for channel-less calls.
    pub fn channel_id(&self) -> Option<ChannelId> {
        match self {
            Self::Join { .. } | Self::ListChannels | Self::CreateChannel { .. } => None,
            Self::DeleteChannel { channel_id }
            | Self::ListMessages { channel_id }
            | Self::PostMessage { channel_id, .. }
            | Self::DeleteMessage { channel_id, .. }
            | Self::SetTyping { channel_id, .. }
            | Self::GetPresence { channel_id }
            | Self::StartMeeting { channel_id, .. } => Some(*channel_id),
        }
    }

    /// Operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::ListChannels => "list_channels",
            Self::CreateChannel { .. } => "create_channel",
            Self::DeleteChannel { .. } => "delete_channel",
            Self::ListMessages { .. } => "list_messages",
            Self::PostMessage { .. } => "post_message",
            Self::DeleteMessage { .. } => "delete_message",
            Self::SetTyping { .. } => "set_typing",
            Self::GetPresence { .. } => "get_presence",
            Self::StartMeeting { .. } => "start_meeting",
        }
    }
}

/// Successful service result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Result of [`Request::Join`].
    Joined {
        /// Resolved channel id.
        channel_id: ChannelId,
        /// Canonical channel name.
        name: String,
    },

    /// Result of [`Request::ListChannels`].
    Channels(Vec<Channel>),

    /// Result of [`Request::CreateChannel`].
    ChannelCreated {
        /// New channel id.
        channel_id: ChannelId,
    },

    /// Result of [`Request::ListMessages`].
    Messages(MessagePage),

    /// Result of [`Request::GetPresence`].
    Presence(PresenceSnapshot),

    /// Plain acknowledgement for mutations.
    Ack,
}
