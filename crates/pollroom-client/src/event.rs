//! Client events and actions.

use pollroom_core::{Body, ChannelId, MessageId, PresenceSnapshot};

use crate::{Request, RequestId, Response, ServiceError};

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Executing requests and feeding their results back as `Response`
/// - Driving time forward via ticks
/// - Forwarding user intents (send, delete, switch channel, scroll)
///
/// Generic over `I` (Instant type) to support both production
/// (std::time::Instant) and simulation (tokio::time::Instant) environments.
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// Begin polling. Activates the general channel.
    Start {
        /// Current time from the environment.
        now: I,
    },

    /// Time tick. Issues due polls and fires the typing timer.
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// Join a channel by name.
    Join {
        /// Channel name.
        channel_name: String,
    },

    /// Switch the active channel.
    SelectChannel {
        /// Channel to activate.
        channel_id: ChannelId,
        /// Current time from the environment.
        now: I,
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

    /// The user edited the input.
    InputChanged {
        /// Current time from the environment.
        now: I,
    },

    /// Post a message to the active channel.
    Submit {
        /// Validated body.
        body: Body,
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

    /// The user scrolled.
    Scrolled {
        /// Distance between the bottom of the log and the viewport edge.
        distance_from_bottom: u32,
    },

    /// The user asked to jump to the newest message.
    JumpToLatest,

    /// A request issued through [`ClientAction::Send`] completed.
    Response {
        /// Id from the `Send` action.
        id: RequestId,
        /// Outcome.
        result: Result<Response, ServiceError>,
        /// Current time from the environment.
        now: I,
    },
}

/// User-facing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Transient, dismissible message.
    Banner(String),
    /// Blocking message the user must acknowledge.
    Alert(String),
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Execute a request and report back with [`ClientEvent::Response`].
    Send {
        /// Correlation id.
        id: RequestId,
        /// Request to execute.
        request: Request,
    },

    /// Visible messages or divider changed; re-read [`crate::Client::timeline`].
    TimelineChanged,

    /// Unread count changed.
    UnreadChanged {
        /// New count.
        count: usize,
    },

    /// Scroll the view to the newest message.
    ScrollToBottom,

    /// Scroll the view so that this message is visible (unread divider).
    ScrollToMessage {
        /// Message directly above the divider.
        message_id: MessageId,
    },

    /// Other people typing in the active channel.
    TypingChanged {
        /// Names, sorted, never including the local user.
        names: Vec<String>,
    },

    /// Presence of the active channel changed.
    PresenceChanged(PresenceSnapshot),

    /// Channel list changed.
    ChannelsChanged,

    /// A channel became active.
    ChannelActivated {
        /// Active channel.
        channel_id: ChannelId,
    },

    /// Show a notice.
    Notice(Notice),
}
