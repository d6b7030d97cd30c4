//! Online names, typing names and the active meeting of one channel.

use pollroom_core::{Meeting, PresenceSnapshot};

/// Ephemeral per-channel presence. Rebuilt from every poll.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    snapshot: PresenceSnapshot,
    typing: Vec<String>,
}

impl PresenceTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the presence snapshot. Returns `true` if it changed.
    pub fn apply(&mut self, snapshot: PresenceSnapshot) -> bool {
        if snapshot == self.snapshot {
            return false;
        }
        self.snapshot = snapshot;
        true
    }

    /// Replace the typing set, excluding `own_name`. Returns `true` if it
    /// changed.
    pub fn apply_typing(&mut self, names: Vec<String>, own_name: Option<&str>) -> bool {
        let mut names: Vec<String> =
            names.into_iter().filter(|n| Some(n.as_str()) != own_name).collect();
        names.sort();
        names.dedup();

        if names == self.typing {
            return false;
        }
        self.typing = names;
        true
    }

    /// Forget everything (channel switch).
    pub fn clear(&mut self) {
        self.snapshot = PresenceSnapshot::default();
        self.typing.clear();
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> &PresenceSnapshot {
        &self.snapshot
    }

    /// Active meeting, if any.
    pub fn meeting(&self) -> Option<&Meeting> {
        self.snapshot.meeting.as_ref()
    }

    /// Other people typing, sorted.
    pub fn typing(&self) -> &[String] {
        &self.typing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_excludes_self() {
        let mut presence = PresenceTracker::new();
        let changed =
            presence.apply_typing(vec!["me".into(), "bo".into(), "ana".into()], Some("me"));

        assert!(changed);
        assert_eq!(presence.typing(), ["ana", "bo"]);
    }

    #[test]
    fn unchanged_snapshot_reports_no_change() {
        let mut presence = PresenceTracker::new();
        let snapshot = PresenceSnapshot {
            online: ["ana".to_string()].into_iter().collect(),
            meeting: Some(Meeting { url: "https://m.example/1".into(), started_by: "ana".into() }),
        };

        assert!(presence.apply(snapshot.clone()));
        assert!(!presence.apply(snapshot));
        assert_eq!(presence.meeting().map(|m| m.started_by.as_str()), Some("ana"));
    }

    #[test]
    fn clear_forgets_meeting() {
        let mut presence = PresenceTracker::new();
        presence.apply(PresenceSnapshot {
            online: Default::default(),
            meeting: Some(Meeting { url: "https://m.example/1".into(), started_by: "bo".into() }),
        });
        presence.clear();

        assert!(presence.meeting().is_none());
    }
}
