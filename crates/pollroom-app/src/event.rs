//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize).
//! - Sync engine notifications translated by the [`crate::Bridge`].

use pollroom_client::{Notice, Timeline};
use pollroom_core::{Channel, ChannelId, MessageId, PresenceSnapshot};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// The input source is gone; shut down.
    Shutdown,

    /// Visible messages or the unread divider changed.
    Timeline(Timeline),

    /// Unread count changed.
    Unread {
        /// New count.
        count: usize,
    },

    /// Scroll to the newest message.
    ScrollToBottom,

    /// Scroll so the unread divider below this message is in view.
    ScrollToMessage {
        /// Message directly above the divider.
        message_id: MessageId,
    },

    /// Other people typing in the active channel.
    Typing {
        /// Sorted names.
        names: Vec<String>,
    },

    /// Presence of the active channel.
    Presence(PresenceSnapshot),

    /// Channel list changed.
    Channels {
        /// Joined channels, General first.
        channels: Vec<Channel>,
    },

    /// A channel became active.
    ChannelActivated {
        /// Active channel.
        channel_id: ChannelId,
        /// Display name.
        name: String,
    },

    /// Notice from the sync engine.
    Notice(Notice),

    /// Local failure (bad command input, unreadable attachment).
    Error {
        /// Error description.
        message: String,
    },
}
