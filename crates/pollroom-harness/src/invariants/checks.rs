//! Standard invariant checks.
//!
//! Each check reads one property of a [`SystemSnapshot`] and names the
//! client that broke it.

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Visible messages are strictly ascending and belong to the active channel.
///
/// Holds no matter how late, duplicated or reordered poll results arrive.
pub struct TimelineOrdered;

impl Invariant for TimelineOrdered {
    fn name(&self) -> &'static str {
        "timeline_ordered"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            for pair in client.timeline.windows(2) {
                if pair[1].0 <= pair[0].0 {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {}: message {} shown after {}",
                            client.id, pair[1].0, pair[0].0
                        ),
                    });
                }
            }

            if let Some(active) = client.active_channel {
                if let Some((id, channel)) = client.timeline.iter().find(|(_, c)| *c != active) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {}: message {id} of channel {channel} shown in {active}",
                            client.id
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The active channel must be listed.
///
/// If `active_channel` is `Some(id)`, then `channels` must contain `id`.
/// This prevents the UI from showing a selected channel that doesn't exist.
pub struct ActiveChannelListed;

impl Invariant for ActiveChannelListed {
    fn name(&self) -> &'static str {
        "active_channel_listed"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if let Some(active) = client.active_channel {
                if !client.channels.contains(&active) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {}: active channel {active} not in {:?}",
                            client.id, client.channels
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Persisted read positions never decrease.
pub struct ReadPositionMonotonic;

impl Invariant for ReadPositionMonotonic {
    fn name(&self) -> &'static str {
        "read_position_monotonic"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            for (channel_id, history) in &client.read_history {
                for pair in history.windows(2) {
                    if pair[1] < pair[0] {
                        return Err(Violation {
                            invariant: self.name(),
                            message: format!(
                                "client {} channel {channel_id}: read position {} -> {}",
                                client.id, pair[0], pair[1]
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// The scroll offset stays within the log.
pub struct ScrollWithinBounds;

impl Invariant for ScrollWithinBounds {
    fn name(&self) -> &'static str {
        "scroll_within_bounds"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if client.scroll_offset > client.max_scroll_offset {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: scroll offset {} beyond {}",
                        client.id, client.scroll_offset, client.max_scroll_offset
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The typing line never names the local user.
pub struct TypingExcludesSelf;

impl Invariant for TypingExcludesSelf {
    fn name(&self) -> &'static str {
        "typing_excludes_self"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if let Some(name) = &client.name {
                if client.typing.contains(name) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("client {}: own name {name} shown as typing", client.id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A view inside the anchor threshold is one the sync engine treats as at
/// the bottom, so unread never accumulates under the reader's eyes.
///
/// Only checked for snapshots that carry the engine's anchor state.
pub struct AnchorFollowsView;

impl Invariant for AnchorFollowsView {
    fn name(&self) -> &'static str {
        "anchor_follows_view"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let Some(anchor) = client.anchor else { continue };
            let near_bottom = u32::try_from(client.scroll_offset)
                .is_ok_and(|offset| offset < anchor.threshold);
            if near_bottom && !anchor.at_bottom {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: offset {} is within {} rows but engine is detached",
                        client.id, client.scroll_offset, anchor.threshold
                    ),
                });
            }
            if anchor.at_bottom && anchor.unread > 0 {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: {} unread while at the bottom",
                        client.id, anchor.unread
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnchorSnapshot, ClientSnapshot};

    fn single(client: ClientSnapshot) -> SystemSnapshot {
        SystemSnapshot::single(client)
    }

    #[test]
    fn unordered_timeline_violates() {
        let client = ClientSnapshot {
            active_channel: Some(1),
            timeline: vec![(1, 1), (3, 1), (2, 1)],
            ..ClientSnapshot::default()
        };
        assert!(TimelineOrdered.check(&single(client)).is_err());
    }

    #[test]
    fn foreign_message_violates() {
        let client = ClientSnapshot {
            active_channel: Some(1),
            timeline: vec![(1, 1), (2, 4)],
            ..ClientSnapshot::default()
        };
        assert!(TimelineOrdered.check(&single(client)).is_err());
    }

    #[test]
    fn unlisted_active_channel_violates() {
        let client = ClientSnapshot {
            active_channel: Some(4),
            channels: vec![1],
            ..ClientSnapshot::default()
        };
        assert!(ActiveChannelListed.check(&single(client)).is_err());
    }

    #[test]
    fn decreasing_read_position_violates() {
        let mut client = ClientSnapshot::default();
        client.record_read(1, 5);
        client.record_read(1, 5);
        assert!(ReadPositionMonotonic.check(&single(client.clone())).is_ok());

        client.record_read(1, 4);
        assert!(ReadPositionMonotonic.check(&single(client)).is_err());
    }

    #[test]
    fn own_typing_violates() {
        let client = ClientSnapshot {
            name: Some("ana".into()),
            typing: vec!["ana".into()],
            ..ClientSnapshot::default()
        };
        assert!(TypingExcludesSelf.check(&single(client)).is_err());
    }

    #[test]
    fn detached_anchor_at_bottom_violates() {
        let anchor = AnchorSnapshot { at_bottom: false, threshold: 2, unread: 3 };
        let client =
            ClientSnapshot { scroll_offset: 1, anchor: Some(anchor), ..ClientSnapshot::default() };
        assert!(AnchorFollowsView.check(&single(client.clone())).is_err());

        // Far enough up, a detached anchor is expected
        let client = ClientSnapshot { scroll_offset: 2, ..client };
        assert!(AnchorFollowsView.check(&single(client)).is_ok());
    }

    #[test]
    fn unread_at_bottom_violates() {
        let anchor = AnchorSnapshot { at_bottom: true, threshold: 2, unread: 1 };
        let client = ClientSnapshot { anchor: Some(anchor), ..ClientSnapshot::default() };
        assert!(AnchorFollowsView.check(&single(client)).is_err());
    }

    #[test]
    fn missing_anchor_is_skipped() {
        let client = ClientSnapshot { scroll_offset: 0, ..ClientSnapshot::default() };
        assert!(AnchorFollowsView.check(&single(client)).is_ok());
    }
}
