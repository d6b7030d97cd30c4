//! Read position, unread count and unread divider for the active channel.

use pollroom_core::MessageId;

use crate::MessageStore;

/// How the view opens after the first page of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstFetch {
    /// Nothing unread; show the newest message.
    CaughtUp,
    /// Messages arrived since the user last read this channel.
    OpenAtDivider {
        /// Last message the user had read
        after: MessageId,
        /// Visible messages after it
        unread: usize,
    },
}

/// Where the unread divider goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divider {
    /// Above the first visible message; nothing visible has been read.
    BeforeFirst,
    /// Directly below this message.
    After(MessageId),
}

/// Read-position tracker for one channel.
///
/// The tracker does not touch storage itself. Methods that advance the read
/// position return the new value for the caller to persist.
///
/// # Invariants
///
/// - `last_read` never decreases.
/// - `unread_count` only grows by the number of new ids on a poll, and only
///   drops to zero when the user reads.
#[derive(Debug, Clone, Default)]
pub struct ReadTracker {
    last_read: Option<MessageId>,
    observed_newest: Option<MessageId>,
    unread: usize,
    fetched: bool,
}

impl ReadTracker {
    /// Tracker for a freshly activated channel with its persisted position.
    pub fn activate(persisted: Option<MessageId>) -> Self {
        Self { last_read: persisted, ..Self::default() }
    }

    /// Whether no page has been applied since activation.
    pub fn is_first_fetch(&self) -> bool {
        !self.fetched
    }

    /// Apply the first page of the session.
    ///
    /// Returns how to open the view and, if the read position advanced, the
    /// value to persist.
    pub fn first_fetch(&mut self, store: &MessageStore) -> (FirstFetch, Option<MessageId>) {
        self.fetched = true;
        self.observed_newest = store.newest_id();

        let Some(newest) = store.newest_id() else {
            return (FirstFetch::CaughtUp, None);
        };

        match self.last_read {
            Some(persisted) if store.contains(persisted) && persisted < newest => {
                let unread = store.count_after(persisted);
                self.unread = unread;
                (FirstFetch::OpenAtDivider { after: persisted, unread }, None)
            },
            // No position yet, or the persisted one scrolled out of the window:
            // the newest message counts as read.
            _ => (FirstFetch::CaughtUp, self.advance(newest)),
        }
    }

    /// Record a later page.
    ///
    /// Returns how many of `added` are newer than the previously observed
    /// newest id. Ids that merely reappear inside the window do not count.
    pub fn observe(&mut self, store: &MessageStore, added: &[MessageId]) -> usize {
        let previous = self.observed_newest;
        let fresh = added.iter().filter(|&&id| previous.is_none_or(|p| id > p)).count();

        if let Some(newest) = store.newest_id() {
            self.observed_newest = Some(previous.map_or(newest, |p| p.max(newest)));
        }
        fresh
    }

    /// Count messages that arrived while the viewer was away from the bottom.
    pub fn add_unread(&mut self, count: usize) {
        self.unread += count;
    }

    /// The user has read up to `newest`.
    ///
    /// Clears the unread count. Returns the new read position when it
    /// advanced.
    pub fn mark_read(&mut self, newest: Option<MessageId>) -> Option<MessageId> {
        self.unread = 0;
        newest.and_then(|id| self.advance(id))
    }

    /// Divider position for the current view. `None` when everything visible
    /// has been read.
    pub fn divider(&self, store: &MessageStore) -> Option<Divider> {
        let newest = store.newest_id()?;
        let Some(last_read) = self.last_read else {
            return Some(Divider::BeforeFirst);
        };
        if last_read >= newest {
            return None;
        }

        let read = store.messages().iter().rev().find(|m| m.id <= last_read);
        match read {
            Some(message) => Some(Divider::After(message.id)),
            None => Some(Divider::BeforeFirst),
        }
    }

    /// Messages counted as unread.
    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Current read position.
    pub fn last_read(&self) -> Option<MessageId> {
        self.last_read
    }

    fn advance(&mut self, id: MessageId) -> Option<MessageId> {
        if self.last_read.is_some_and(|current| current >= id) {
            return None;
        }
        self.last_read = Some(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use pollroom_core::Message;

    use super::*;

    fn store_with(ids: &[MessageId]) -> MessageStore {
        let mut store = MessageStore::new();
        store.reset(1);
        store.merge(
            ids.iter()
                .map(|&id| Message {
                    id,
                    channel_id: 1,
                    author: "bo".into(),
                    body: String::new(),
                    timestamp: String::new(),
                })
                .collect(),
        );
        store
    }

    #[test]
    fn first_fetch_without_position_marks_newest_read() {
        let store = store_with(&[1, 2, 3]);
        let mut tracker = ReadTracker::activate(None);

        assert_eq!(tracker.first_fetch(&store), (FirstFetch::CaughtUp, Some(3)));
        assert_eq!(tracker.unread_count(), 0);
        assert_eq!(tracker.divider(&store), None);
    }

    #[test]
    fn first_fetch_with_evicted_position_falls_back_to_newest() {
        let store = store_with(&[10, 11, 12]);
        let mut tracker = ReadTracker::activate(Some(4));

        assert_eq!(tracker.first_fetch(&store), (FirstFetch::CaughtUp, Some(12)));
        assert_eq!(tracker.last_read(), Some(12));
    }

    #[test]
    fn first_fetch_with_position_beyond_window_never_moves_backwards() {
        let store = store_with(&[1, 2]);
        let mut tracker = ReadTracker::activate(Some(40));

        assert_eq!(tracker.first_fetch(&store), (FirstFetch::CaughtUp, None));
        assert_eq!(tracker.last_read(), Some(40));
    }

    #[test]
    fn first_fetch_opens_at_divider() {
        let store = store_with(&[1, 2, 3, 4, 5]);
        let mut tracker = ReadTracker::activate(Some(2));

        assert_eq!(
            tracker.first_fetch(&store),
            (FirstFetch::OpenAtDivider { after: 2, unread: 3 }, None)
        );
        assert_eq!(tracker.unread_count(), 3);
        assert_eq!(tracker.divider(&store), Some(Divider::After(2)));
    }

    #[test]
    fn first_fetch_caught_up() {
        let store = store_with(&[1, 2]);
        let mut tracker = ReadTracker::activate(Some(2));

        assert_eq!(tracker.first_fetch(&store), (FirstFetch::CaughtUp, None));
        assert!(!tracker.is_first_fetch());
    }

    #[test]
    fn empty_first_fetch_leaves_position_alone() {
        let store = store_with(&[]);
        let mut tracker = ReadTracker::activate(Some(7));

        assert_eq!(tracker.first_fetch(&store), (FirstFetch::CaughtUp, None));
        assert_eq!(tracker.divider(&store), None);
    }

    #[test]
    fn observe_counts_only_ids_past_previous_newest() {
        let mut tracker = ReadTracker::activate(None);
        tracker.first_fetch(&store_with(&[8, 9, 10]));

        let store = store_with(&[9, 10, 11, 12]);
        assert_eq!(tracker.observe(&store, &[11, 12]), 2);

        // 9 reappears after a transient gap; not new
        assert_eq!(tracker.observe(&store, &[9]), 0);
    }

    #[test]
    fn mark_read_resets_and_advances() {
        let store = store_with(&[1, 2, 3]);
        let mut tracker = ReadTracker::activate(Some(1));
        tracker.first_fetch(&store);
        tracker.add_unread(4);

        assert_eq!(tracker.mark_read(Some(3)), Some(3));
        assert_eq!(tracker.unread_count(), 0);
        assert_eq!(tracker.mark_read(Some(2)), None);
        assert_eq!(tracker.last_read(), Some(3));
    }

    #[test]
    fn divider_before_first_when_nothing_read() {
        let store = store_with(&[5, 6]);
        let tracker = ReadTracker::activate(None);
        assert_eq!(tracker.divider(&store), Some(Divider::BeforeFirst));

        let tracker = ReadTracker::activate(Some(2));
        assert_eq!(tracker.divider(&store), Some(Divider::BeforeFirst));
    }

    #[test]
    fn divider_follows_nearest_read_message() {
        // 3 was read, then deleted
        let store = store_with(&[1, 2, 4, 5]);
        let tracker = ReadTracker::activate(Some(3));

        assert_eq!(tracker.divider(&store), Some(Divider::After(2)));
    }
}
