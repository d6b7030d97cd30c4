//! Ordered, deduplicated message view for the active channel.
//!
//! The store is a cache. Every page from the collaborator service replaces it
//! wholesale, so missed polls heal on the next one. The only local state that
//! survives a merge is the set of deletes not yet confirmed.

use std::collections::{BTreeMap, BTreeSet};

use pollroom_core::{ChannelId, Message, MessageId};

/// Result of merging one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Ids visible now that were not visible before the merge.
    pub added: Vec<MessageId>,
    /// Whether the visible list differs from before the merge.
    pub changed: bool,
}

/// Messages of one channel, ascending by id.
///
/// # Invariants
///
/// - Visible messages are strictly ascending by id.
/// - Every visible message belongs to the store's channel.
/// - A message with a pending or confirmed delete is never visible.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    channel_id: Option<ChannelId>,
    messages: Vec<Message>,
    pending_deletes: BTreeMap<MessageId, Message>,
    deleted: BTreeSet<MessageId>,
}

impl MessageStore {
    /// Create an empty store bound to no channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything and bind to `channel_id`.
    pub fn reset(&mut self, channel_id: ChannelId) {
        self.channel_id = Some(channel_id);
        self.messages.clear();
        self.pending_deletes.clear();
        self.deleted.clear();
    }

    /// Channel the store holds.
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.channel_id
    }

    /// Replace the view with a full page from the service.
    ///
    /// Messages with no channel id are attributed to the store's channel;
    /// messages of other channels are dropped. Input order is irrelevant.
    pub fn merge(&mut self, page: Vec<Message>) -> MergeOutcome {
        let Some(channel_id) = self.channel_id else {
            return MergeOutcome::default();
        };

        let mut incoming: Vec<Message> = page
            .into_iter()
            .map(|mut msg| {
                if msg.channel_id == 0 {
                    msg.channel_id = channel_id;
                }
                msg
            })
            .filter(|msg| msg.channel_id == channel_id)
            .filter(|msg| !self.pending_deletes.contains_key(&msg.id))
            .filter(|msg| !self.deleted.contains(&msg.id))
            .collect();

        incoming.sort_by_key(|msg| msg.id);
        incoming.dedup_by_key(|msg| msg.id);

        let before: BTreeSet<MessageId> = self.messages.iter().map(|m| m.id).collect();
        let added: Vec<MessageId> =
            incoming.iter().map(|m| m.id).filter(|id| !before.contains(id)).collect();
        let changed = incoming != self.messages;

        self.messages = incoming;
        MergeOutcome { added, changed }
    }

    /// Visible messages, ascending.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Visible message by id.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index_of(id).map(|i| &self.messages[i])
    }

    /// Whether `id` is visible.
    pub fn contains(&self, id: MessageId) -> bool {
        self.index_of(id).is_some()
    }

    /// Newest visible message.
    pub fn newest(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Id of the newest visible message.
    pub fn newest_id(&self) -> Option<MessageId> {
        self.newest().map(|m| m.id)
    }

    /// Number of visible messages with an id greater than `id`.
    pub fn count_after(&self, id: MessageId) -> usize {
        self.messages.len() - self.messages.partition_point(|m| m.id <= id)
    }

    /// Number of visible messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tentatively remove a message.
    ///
    /// It stays hidden from later merges until confirmed or rolled back.
    /// Returns `None` if the message is not visible.
    pub fn begin_delete(&mut self, id: MessageId) -> Option<&Message> {
        let index = self.index_of(id)?;
        let message = self.messages.remove(index);
        let pending: &Message = self.pending_deletes.entry(id).or_insert(message);
        Some(pending)
    }

    /// The service confirmed the delete.
    pub fn confirm_delete(&mut self, id: MessageId) -> bool {
        if self.pending_deletes.remove(&id).is_some() {
            self.deleted.insert(id);
            true
        } else {
            false
        }
    }

    /// The service rejected the delete; put the message back in order.
    pub fn rollback_delete(&mut self, id: MessageId) -> bool {
        let Some(message) = self.pending_deletes.remove(&id) else {
            return false;
        };
        if let Err(index) = self.messages.binary_search_by_key(&id, |m| m.id) {
            self.messages.insert(index, message);
        }
        true
    }

    /// Whether a delete for `id` is awaiting confirmation.
    pub fn is_pending_delete(&self, id: MessageId) -> bool {
        self.pending_deletes.contains_key(&id)
    }

    fn index_of(&self, id: MessageId) -> Option<usize> {
        self.messages.binary_search_by_key(&id, |m| m.id).ok()
    }
}
