//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use std::collections::HashMap;

use pollroom_app::App;
use pollroom_client::{Client, ReadPositionStore};
use pollroom_core::{ChannelId, MessageId, Timestamp};

/// Snapshot of the entire system state.
///
/// Contains observable state from one or more clients for invariant checking.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone, Default)]
pub struct ClientSnapshot {
    /// Client identifier.
    pub id: u64,
    /// Local display name.
    pub name: Option<String>,
    /// Active channel, if any.
    pub active_channel: Option<ChannelId>,
    /// Listed channel ids.
    pub channels: Vec<ChannelId>,
    /// Visible messages in display order as `(message, channel)`.
    pub timeline: Vec<(MessageId, ChannelId)>,
    /// Log rows hidden below the viewport.
    pub scroll_offset: usize,
    /// Largest valid scroll offset.
    pub max_scroll_offset: usize,
    /// Names shown as typing.
    pub typing: Vec<String>,
    /// Persisted read positions observed over time, per channel.
    pub read_history: HashMap<ChannelId, Vec<MessageId>>,
    /// Sync engine's view of the bottom, when captured alongside the App.
    pub anchor: Option<AnchorSnapshot>,
}

/// What the sync engine believes about the viewer's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSnapshot {
    /// Engine classifies the viewer as at the bottom.
    pub at_bottom: bool,
    /// Distance still counted as at the bottom.
    pub threshold: u32,
    /// Unread count held by the engine.
    pub unread: usize,
}

impl ClientSnapshot {
    /// Capture the view state of `app`.
    pub fn from_app(app: &App) -> Self {
        let view = app.view();
        Self {
            id: 0,
            name: app.name().map(str::to_string),
            active_channel: view.active_channel(),
            channels: view.channels.iter().map(|c| c.id).collect(),
            timeline: view.entries.iter().map(|e| (e.message.id, e.message.channel_id)).collect(),
            scroll_offset: app.scroll_offset(),
            max_scroll_offset: view.row_count().saturating_sub(app.viewport_rows()),
            typing: view.typing.clone(),
            read_history: HashMap::new(),
            anchor: None,
        }
    }

    /// Attach the anchor state of the client driving `from_app`'s App.
    #[must_use]
    pub fn with_client<S, I>(mut self, client: &Client<S, I>) -> Self
    where
        S: ReadPositionStore,
        I: Timestamp,
    {
        self.anchor = Some(AnchorSnapshot {
            at_bottom: client.is_at_bottom(),
            threshold: client.anchor_threshold(),
            unread: client.unread_count(),
        });
        self
    }

    /// Set the client identifier.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Record a read-position observation for history tracking.
    pub fn record_read(&mut self, channel_id: ChannelId, message_id: MessageId) {
        self.read_history.entry(channel_id).or_default().push(message_id);
    }
}
