//! Poll scheduling and stale-response rejection.
//!
//! The sync loop does not perform I/O. It tells the [`crate::Client`] which
//! polls are due, hands out request tags, and decides whether a completed
//! poll may still be applied.

use std::time::Duration;

use pollroom_core::{ChannelId, Timestamp};

use crate::{RequestId, RequestTag};

/// Recurring poll kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKind {
    /// Message window plus typing set for the active channel.
    Messages,
    /// Online names plus meeting for the active channel.
    Presence,
    /// Joined channel list. Not channel-scoped.
    Channels,
}

impl PollKind {
    const ALL: [PollKind; 3] = [PollKind::Messages, PollKind::Presence, PollKind::Channels];

    fn index(self) -> usize {
        match self {
            Self::Messages => 0,
            Self::Presence => 1,
            Self::Channels => 2,
        }
    }

    /// Whether responses of this kind belong to one channel.
    pub fn is_channel_scoped(self) -> bool {
        !matches!(self, Self::Channels)
    }
}

/// Timing configuration for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Interval between message polls.
    pub message_interval: Duration,
    /// Interval between presence polls.
    pub presence_interval: Duration,
    /// Interval between channel list polls.
    pub channel_interval: Duration,
    /// Quiet period after the last keystroke before typing turns off.
    pub typing_quiet_period: Duration,
    /// Distance from the bottom (in frontend units) still counted as at
    /// bottom.
    pub anchor_threshold: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            message_interval: Duration::from_secs(2),
            presence_interval: Duration::from_secs(5),
            channel_interval: Duration::from_secs(15),
            typing_quiet_period: Duration::from_millis(3000),
            anchor_threshold: 100,
        }
    }
}

/// Whether a completed poll may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Apply the result.
    Apply,
    /// Drop the result without touching state.
    Stale {
        /// Why it was dropped
        reason: StaleReason,
    },
}

/// Why a poll result was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// Issued for a channel that is no longer active.
    ChannelChanged,
    /// A newer result of the same kind was already applied.
    Superseded,
}

/// Poll schedule for one client.
///
/// # Invariants
///
/// - Request ids are strictly increasing.
/// - For each kind, the id of the last applied result never decreases.
/// - A channel-scoped result is applied only while its channel is active.
#[derive(Debug, Clone)]
pub struct SyncLoop<I: Timestamp> {
    config: SyncConfig,
    active: Option<ChannelId>,
    next_id: RequestId,
    deadlines: [Option<I>; 3],
    last_applied: [RequestId; 3],
}

impl<I: Timestamp> SyncLoop<I> {
    /// Create an idle loop. Nothing is due until [`SyncLoop::start`].
    pub fn new(config: SyncConfig) -> Self {
        Self { config, active: None, next_id: 1, deadlines: [None; 3], last_applied: [0; 3] }
    }

    /// Timing configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Channel currently being polled.
    pub fn active(&self) -> Option<ChannelId> {
        self.active
    }

    /// Begin polling the channel directory. The first poll is due now.
    pub fn start(&mut self, now: I) {
        self.deadlines[PollKind::Channels.index()] = Some(now);
    }

    /// Switch polling to `channel_id`.
    ///
    /// Messages and presence are due immediately. Results of requests issued
    /// before activation are rejected even if they name the same channel.
    pub fn activate(&mut self, channel_id: ChannelId, now: I) {
        self.active = Some(channel_id);
        for kind in [PollKind::Messages, PollKind::Presence] {
            self.deadlines[kind.index()] = Some(now);
            self.last_applied[kind.index()] = self.next_id - 1;
        }
    }

    /// Stop polling channel-scoped kinds.
    pub fn deactivate(&mut self) {
        self.active = None;
        self.deadlines[PollKind::Messages.index()] = None;
        self.deadlines[PollKind::Presence.index()] = None;
    }

    /// Reject every outstanding result of `kind` and poll it again now.
    ///
    /// Used after local mutations that make in-flight results outdated (a
    /// channel list requested before a join would drop the new channel).
    pub fn invalidate(&mut self, kind: PollKind, now: I) {
        self.last_applied[kind.index()] = self.next_id - 1;
        if !kind.is_channel_scoped() || self.active.is_some() {
            self.deadlines[kind.index()] = Some(now);
        }
    }

    /// Kinds due at `now`, each rescheduled one interval later.
    ///
    /// A tick arriving late never yields the same kind twice.
    pub fn due(&mut self, now: I) -> Vec<PollKind> {
        let mut due = Vec::new();
        for kind in PollKind::ALL {
            let slot = &mut self.deadlines[kind.index()];
            if slot.is_some_and(|deadline| deadline <= now) {
                *slot = Some(now + interval(&self.config, kind));
                due.push(kind);
            }
        }
        due
    }

    /// Earliest scheduled poll.
    pub fn next_deadline(&self) -> Option<I> {
        self.deadlines.iter().flatten().copied().min()
    }

    /// Allocate a tag for a request against `channel_id`.
    pub fn next_tag(&mut self, channel_id: Option<ChannelId>) -> RequestTag {
        let id = self.next_id;
        self.next_id += 1;
        RequestTag { id, channel_id }
    }

    /// Decide whether a completed poll of `kind` may be applied.
    ///
    /// Accepting a result records it as the newest applied of its kind.
    pub fn accept(&mut self, kind: PollKind, tag: RequestTag) -> Acceptance {
        if kind.is_channel_scoped() && (tag.channel_id.is_none() || tag.channel_id != self.active) {
            return Acceptance::Stale { reason: StaleReason::ChannelChanged };
        }

        let last = &mut self.last_applied[kind.index()];
        if tag.id <= *last {
            return Acceptance::Stale { reason: StaleReason::Superseded };
        }

        *last = tag.id;
        Acceptance::Apply
    }
}

fn interval(config: &SyncConfig, kind: PollKind) -> Duration {
    match kind {
        PollKind::Messages => config.message_interval,
        PollKind::Presence => config.presence_interval,
        PollKind::Channels => config.channel_interval,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn sync() -> (SyncLoop<Instant>, Instant) {
        (SyncLoop::new(SyncConfig::default()), Instant::now())
    }

    #[test]
    fn start_polls_channels_immediately() {
        let (mut sync, t0) = sync();
        assert!(sync.due(t0).is_empty());

        sync.start(t0);
        assert_eq!(sync.due(t0), vec![PollKind::Channels]);
        assert!(sync.due(t0 + Duration::from_secs(14)).is_empty());
        assert_eq!(sync.due(t0 + Duration::from_secs(15)), vec![PollKind::Channels]);
    }

    #[test]
    fn activation_polls_messages_and_presence_independently() {
        let (mut sync, t0) = sync();
        sync.activate(5, t0);

        assert_eq!(sync.due(t0), vec![PollKind::Messages, PollKind::Presence]);
        assert_eq!(sync.due(t0 + Duration::from_secs(2)), vec![PollKind::Messages]);
        assert_eq!(sync.due(t0 + Duration::from_secs(4)), vec![PollKind::Messages]);
        assert_eq!(sync.due(t0 + Duration::from_secs(5)), vec![PollKind::Presence]);
    }

    #[test]
    fn late_tick_is_not_replayed() {
        let (mut sync, t0) = sync();
        sync.activate(5, t0);
        sync.due(t0);

        let late = t0 + Duration::from_secs(9);
        assert_eq!(sync.due(late), vec![PollKind::Messages, PollKind::Presence]);
        assert!(sync.due(late).is_empty());
        assert_eq!(sync.next_deadline(), Some(late + Duration::from_secs(2)));
    }

    #[test]
    fn tags_are_strictly_increasing() {
        let (mut sync, _) = sync();
        let a = sync.next_tag(Some(1));
        let b = sync.next_tag(None);
        assert!(b.id > a.id);
    }

    #[test]
    fn response_for_previous_channel_is_stale() {
        let (mut sync, t0) = sync();
        sync.activate(1, t0);
        let tag = sync.next_tag(Some(1));

        sync.activate(2, t0);
        assert_eq!(
            sync.accept(PollKind::Messages, tag),
            Acceptance::Stale { reason: StaleReason::ChannelChanged }
        );
    }

    #[test]
    fn request_issued_before_reactivation_is_stale() {
        let (mut sync, t0) = sync();
        sync.activate(1, t0);
        let old = sync.next_tag(Some(1));

        sync.activate(2, t0);
        sync.activate(1, t0);
        assert_eq!(
            sync.accept(PollKind::Messages, old),
            Acceptance::Stale { reason: StaleReason::Superseded }
        );
    }

    #[test]
    fn older_result_after_newer_is_superseded() {
        let (mut sync, t0) = sync();
        sync.activate(1, t0);
        let first = sync.next_tag(Some(1));
        let second = sync.next_tag(Some(1));

        assert_eq!(sync.accept(PollKind::Messages, second), Acceptance::Apply);
        assert_eq!(
            sync.accept(PollKind::Messages, first),
            Acceptance::Stale { reason: StaleReason::Superseded }
        );
    }

    #[test]
    fn overlapping_results_in_order_both_apply() {
        let (mut sync, t0) = sync();
        sync.activate(1, t0);
        let first = sync.next_tag(Some(1));
        let second = sync.next_tag(Some(1));

        assert_eq!(sync.accept(PollKind::Messages, first), Acceptance::Apply);
        assert_eq!(sync.accept(PollKind::Messages, second), Acceptance::Apply);
    }

    #[test]
    fn kinds_are_tracked_separately() {
        let (mut sync, t0) = sync();
        sync.activate(1, t0);
        let messages = sync.next_tag(Some(1));
        let presence = sync.next_tag(Some(1));

        assert_eq!(sync.accept(PollKind::Presence, presence), Acceptance::Apply);
        assert_eq!(sync.accept(PollKind::Messages, messages), Acceptance::Apply);
    }

    #[test]
    fn invalidate_rejects_outstanding_channel_lists() {
        let (mut sync, t0) = sync();
        sync.start(t0);
        sync.due(t0);
        let before = sync.next_tag(None);

        sync.invalidate(PollKind::Channels, t0);
        assert_eq!(sync.due(t0), vec![PollKind::Channels]);
        assert_eq!(
            sync.accept(PollKind::Channels, before),
            Acceptance::Stale { reason: StaleReason::Superseded }
        );

        let after = sync.next_tag(None);
        assert_eq!(sync.accept(PollKind::Channels, after), Acceptance::Apply);
    }

    #[test]
    fn deactivate_stops_channel_polls() {
        let (mut sync, t0) = sync();
        sync.start(t0);
        sync.activate(3, t0);
        sync.deactivate();

        assert_eq!(sync.due(t0), vec![PollKind::Channels]);
        assert_eq!(sync.active(), None);
    }
}
