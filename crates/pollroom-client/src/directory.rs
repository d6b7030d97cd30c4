//! Joined channels and admin flags.

use pollroom_core::{Channel, ChannelId, GENERAL_CHANNEL_ID};

/// The channels the session belongs to, in service order.
///
/// # Invariants
///
/// - The general channel is always present.
/// - The active channel, if any, is present.
#[derive(Debug, Clone)]
pub struct ChannelDirectory {
    channels: Vec<Channel>,
    active: Option<ChannelId>,
}

impl Default for ChannelDirectory {
    fn default() -> Self {
        Self { channels: vec![Channel::general()], active: None }
    }
}

impl ChannelDirectory {
    /// Directory holding only the general channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a page from the service.
    ///
    /// Returns `true` if anything visible changed. If the active channel is
    /// gone the directory falls back to general.
    pub fn replace(&mut self, mut channels: Vec<Channel>) -> bool {
        let mut seen = std::collections::BTreeSet::new();
        channels.retain(|c| seen.insert(c.id));
        if !channels.iter().any(|c| c.id == GENERAL_CHANNEL_ID) {
            channels.insert(0, Channel::general());
        }

        let changed = channels != self.channels;
        self.channels = channels;
        if self.active.is_some_and(|id| !self.contains(id)) {
            self.active = Some(GENERAL_CHANNEL_ID);
        }
        changed
    }

    /// Add or rename a channel (after join or create).
    pub fn upsert(&mut self, channel: Channel) {
        match self.channels.iter_mut().find(|c| c.id == channel.id) {
            Some(existing) => {
                existing.name = channel.name;
                existing.is_admin |= channel.is_admin;
            },
            None => self.channels.push(channel),
        }
    }

    /// Remove a channel. General is never removed.
    ///
    /// Returns `true` if the active channel was removed, in which case
    /// general becomes active.
    pub fn remove(&mut self, id: ChannelId) -> bool {
        if id == GENERAL_CHANNEL_ID {
            return false;
        }
        self.channels.retain(|c| c.id != id);
        if self.active == Some(id) {
            self.active = Some(GENERAL_CHANNEL_ID);
            true
        } else {
            false
        }
    }

    /// Make `id` active. Returns `false` if the channel is unknown.
    pub fn select(&mut self, id: ChannelId) -> bool {
        if self.contains(id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// Active channel id.
    pub fn active(&self) -> Option<ChannelId> {
        self.active
    }

    /// Channel after the active one, wrapping around.
    pub fn next_after(&self, id: Option<ChannelId>) -> Option<ChannelId> {
        let position = id.and_then(|id| self.channels.iter().position(|c| c.id == id));
        let next = position.map_or(0, |p| (p + 1) % self.channels.len());
        self.channels.get(next).map(|c| c.id)
    }

    /// Look up a channel.
    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Find a channel by exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Whether the channel is known.
    pub fn contains(&self, id: ChannelId) -> bool {
        self.get(id).is_some()
    }

    /// Whether the local user administers the channel.
    pub fn is_admin(&self, id: ChannelId) -> bool {
        self.get(id).is_some_and(|c| c.is_admin)
    }

    /// Whether the local user may delete the channel.
    pub fn can_delete(&self, id: ChannelId) -> bool {
        id != GENERAL_CHANNEL_ID && self.is_admin(id)
    }

    /// All channels.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
}
