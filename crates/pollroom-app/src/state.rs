//! Observable view state.
//!
//! [`ChatView`] is the view model of the active channel: the subset of
//! sync engine state needed to render the UI, updated from [`crate::AppEvent`]s.

use pollroom_client::{Divider, Timeline, TimelineEntry};
use pollroom_core::{Channel, ChannelId, MessageId, PresenceSnapshot};

/// One rendered row of the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineRow<'a> {
    /// The "new messages" divider.
    Divider,
    /// A message.
    Entry(&'a TimelineEntry),
}

/// What the UI shows for the active channel.
#[derive(Debug, Clone, Default)]
pub struct ChatView {
    /// Visible messages, ascending by id.
    pub entries: Vec<TimelineEntry>,
    /// Unread divider position.
    pub divider: Option<Divider>,
    /// Unread count shown on the jump-to-latest affordance.
    pub unread: usize,
    /// Other people typing.
    pub typing: Vec<String>,
    /// Online names and the active meeting.
    pub presence: PresenceSnapshot,
    /// Joined channels.
    pub channels: Vec<Channel>,
    /// Active channel and its display name.
    pub active: Option<(ChannelId, String)>,
}

impl ChatView {
    /// Replace messages and divider.
    pub fn apply_timeline(&mut self, timeline: Timeline) {
        self.entries = timeline.entries;
        self.divider = timeline.divider;
    }

    /// Clear per-channel state on a channel switch.
    pub fn activate(&mut self, channel_id: ChannelId, name: String) {
        self.entries.clear();
        self.divider = None;
        self.unread = 0;
        self.typing.clear();
        self.presence = PresenceSnapshot::default();
        self.active = Some((channel_id, name));
    }

    /// Active channel id.
    pub fn active_channel(&self) -> Option<ChannelId> {
        self.active.as_ref().map(|(id, _)| *id)
    }

    /// Rows in display order, divider included.
    pub fn rows(&self) -> Vec<TimelineRow<'_>> {
        let mut rows = Vec::with_capacity(self.entries.len() + 1);
        if self.divider == Some(Divider::BeforeFirst) {
            rows.push(TimelineRow::Divider);
        }
        for entry in &self.entries {
            rows.push(TimelineRow::Entry(entry));
            if self.divider == Some(Divider::After(entry.message.id)) {
                rows.push(TimelineRow::Divider);
            }
        }
        rows
    }

    /// Total row count.
    pub fn row_count(&self) -> usize {
        self.entries.len() + usize::from(self.divider.is_some())
    }

    /// Rows strictly below `message_id`, or `None` if it is not visible.
    pub fn rows_below(&self, message_id: MessageId) -> Option<usize> {
        let rows = self.rows();
        let at = rows
            .iter()
            .position(|row| matches!(row, TimelineRow::Entry(e) if e.message.id == message_id))?;
        Some(rows.len() - at - 1)
    }

    /// Channel after the active one in list order, wrapping around.
    pub fn next_channel(&self) -> Option<ChannelId> {
        if self.channels.is_empty() {
            return None;
        }
        let current = self.active_channel();
        let idx = current.and_then(|id| self.channels.iter().position(|c| c.id == id));
        let next = idx.map_or(0, |i| (i + 1) % self.channels.len());
        self.channels.get(next).map(|c| c.id)
    }
}
