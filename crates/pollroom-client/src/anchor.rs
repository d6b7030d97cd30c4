//! At-bottom classification and auto-advance.
//!
//! Units are whatever the frontend scrolls in (pixels, rows). The client only
//! sees distances.

/// Scroll geometry reported by a frontend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Offset of the viewport's top edge from the top of the log.
    pub scroll_offset: u32,
    /// Total height of the rendered log.
    pub content_height: u32,
    /// Height of the visible area.
    pub viewport_height: u32,
}

impl Viewport {
    /// Distance between the bottom of the log and the bottom viewport edge.
    pub fn distance_from_bottom(&self) -> u32 {
        self.content_height.saturating_sub(self.scroll_offset.saturating_add(self.viewport_height))
    }
}

/// What to do with the view when a batch of new messages arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorDecision {
    /// Scroll to the newest message; it counts as read.
    Advance,
    /// Leave the viewport where it is.
    Hold,
}

/// Tracks whether the viewer is anchored to the newest message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    threshold: u32,
    at_bottom: bool,
}

impl ScrollAnchor {
    /// Anchor that starts at the bottom. A zero threshold is raised to one so
    /// that an exact bottom position still counts.
    pub fn new(threshold: u32) -> Self {
        Self { threshold: threshold.max(1), at_bottom: true }
    }

    /// Reclassify after a scroll event.
    pub fn observe(&mut self, distance_from_bottom: u32) -> bool {
        self.at_bottom = distance_from_bottom < self.threshold;
        self.at_bottom
    }

    /// Whether the viewer is at the bottom.
    pub fn is_at_bottom(&self) -> bool {
        self.at_bottom
    }

    /// Decide for a batch that just arrived.
    ///
    /// Must be called before the batch is rendered: the at-bottom state is
    /// the one from immediately before it.
    pub fn decide(&mut self, newest_is_own: bool) -> AnchorDecision {
        if self.at_bottom || newest_is_own {
            self.at_bottom = true;
            AnchorDecision::Advance
        } else {
            AnchorDecision::Hold
        }
    }

    /// Force the anchor to the bottom (jump to latest).
    pub fn pin(&mut self) {
        self.at_bottom = true;
    }

    /// Detach from the bottom (view opened at the unread divider).
    pub fn release(&mut self) {
        self.at_bottom = false;
    }

    /// Distance threshold.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
