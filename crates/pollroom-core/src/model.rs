//! Service data model.
//!
//! These types mirror what the collaborator service returns. Field names
//! follow the wire format where it differs from ours (`date`, `meeting_url`)
//! through serde renames, so the rest of the client never sees wire spelling.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Channel identifier assigned by the collaborator service.
pub type ChannelId = u64;

/// Message identifier. Strictly increasing within a channel.
pub type MessageId = u64;

/// The default channel every session belongs to. Never deletable.
pub const GENERAL_CHANNEL_ID: ChannelId = 1;

/// Display name of [`GENERAL_CHANNEL_ID`].
pub const GENERAL_CHANNEL_NAME: &str = "General";

/// A joined channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Service-assigned identifier.
    pub id: ChannelId,
    /// Display name.
    pub name: String,
    /// Local user may delete the channel and any message in it.
    #[serde(default)]
    pub is_admin: bool,
}

impl Channel {
    /// The built-in general channel.
    pub fn general() -> Self {
        Self { id: GENERAL_CHANNEL_ID, name: GENERAL_CHANNEL_NAME.to_string(), is_admin: false }
    }
}

/// A message as stored by the collaborator service.
///
/// Immutable once created. `body` is the wire string; decode it with
/// [`crate::Body::decode`] before presenting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Service-assigned identifier, the sole sort key.
    pub id: MessageId,
    /// Owning channel. Older services omit it; the client fills it in from
    /// the request that fetched the page.
    #[serde(default)]
    pub channel_id: ChannelId,
    /// Author display name.
    pub author: String,
    /// Tag-prefixed wire body.
    pub body: String,
    /// Creation time as reported by the service (ISO-8601).
    #[serde(default, alias = "date")]
    pub timestamp: String,
}

/// One `listMessages` result: the current window plus who is typing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    /// Messages in service order (not necessarily ascending).
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Names currently signalling "typing", possibly including our own.
    #[serde(default)]
    pub typing: Vec<String>,
}

/// An active meeting in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// URL to open in an external viewer.
    #[serde(rename = "meeting_url", alias = "url")]
    pub url: String,
    /// Display name of whoever started it.
    pub started_by: String,
}

/// Presence poll result for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    /// Names seen online recently.
    #[serde(default)]
    pub online: BTreeSet<String>,
    /// At most one active meeting.
    #[serde(default)]
    pub meeting: Option<Meeting>,
}
