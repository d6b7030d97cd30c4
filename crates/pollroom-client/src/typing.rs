//! Typing signal debouncer.
//!
//! Every keystroke reports "typing". After a quiet period with no keystroke,
//! exactly one "stopped typing" goes out. Channel switches and submits flush
//! a pending timer with an immediate "stopped typing" so no indicator is left
//! hanging on the other side.

use std::time::Duration;

use pollroom_core::{ChannelId, Timestamp};

/// A typing state change to report to the collaborator service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingSignal {
    /// Channel being typed in.
    pub channel_id: ChannelId,
    /// On or off.
    pub is_typing: bool,
}

#[derive(Debug, Clone, Copy)]
struct Armed<I> {
    channel_id: ChannelId,
    deadline: I,
}

/// Keystroke debouncer with flush points.
#[derive(Debug, Clone)]
pub struct TypingDebouncer<I: Timestamp> {
    quiet_period: Duration,
    armed: Option<Armed<I>>,
}

impl<I: Timestamp> TypingDebouncer<I> {
    /// Debouncer that turns typing off after `quiet_period` without input.
    pub fn new(quiet_period: Duration) -> Self {
        Self { quiet_period, armed: None }
    }

    /// A keystroke in `channel_id`.
    ///
    /// Always reports typing. If the timer was armed for another channel,
    /// that channel is flushed first.
    pub fn keystroke(&mut self, channel_id: ChannelId, now: I) -> Vec<TypingSignal> {
        let mut signals = Vec::with_capacity(2);
        if self.armed.is_some_and(|armed| armed.channel_id != channel_id) {
            signals.extend(self.flush());
        }

        self.armed = Some(Armed { channel_id, deadline: now + self.quiet_period });
        signals.push(TypingSignal { channel_id, is_typing: true });
        signals
    }

    /// Fire the quiet timer if it has elapsed.
    pub fn poll(&mut self, now: I) -> Option<TypingSignal> {
        match self.armed {
            Some(armed) if armed.deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// Cancel the timer, reporting "stopped typing" if it was armed.
    pub fn flush(&mut self) -> Option<TypingSignal> {
        self.armed.take().map(|armed| TypingSignal { channel_id: armed.channel_id, is_typing: false })
    }

    /// When the quiet timer fires.
    pub fn deadline(&self) -> Option<I> {
        self.armed.map(|armed| armed.deadline)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_sends_one_off_signal_after_quiet_period() {
        let t0 = Instant::now();
        let mut typing = TypingDebouncer::new(ms(3000));
        let mut on = 0;

        for i in 0..5 {
            let now = t0 + ms(i * 500);
            on += typing.keystroke(1, now).iter().filter(|s| s.is_typing).count();
            assert_eq!(typing.poll(now), None);
        }
        assert_eq!(on, 5);

        let last = t0 + ms(2000);
        assert_eq!(typing.poll(last + ms(2999)), None);
        assert_eq!(typing.poll(last + ms(3000)), Some(TypingSignal { channel_id: 1, is_typing: false }));
        assert_eq!(typing.poll(last + ms(9000)), None);
    }

    #[test]
    fn flush_emits_final_off_once() {
        let t0 = Instant::now();
        let mut typing = TypingDebouncer::new(ms(3000));
        typing.keystroke(4, t0);

        assert_eq!(typing.flush(), Some(TypingSignal { channel_id: 4, is_typing: false }));
        assert_eq!(typing.flush(), None);
        assert_eq!(typing.deadline(), None);
    }

    #[test]
    fn flush_without_keystroke_is_silent() {
        let mut typing = TypingDebouncer::<Instant>::new(ms(3000));
        assert_eq!(typing.flush(), None);
    }

    #[test]
    fn keystroke_in_other_channel_flushes_previous() {
        let t0 = Instant::now();
        let mut typing = TypingDebouncer::new(ms(3000));
        typing.keystroke(1, t0);

        let signals = typing.keystroke(2, t0 + ms(10));
        assert_eq!(
            signals,
            vec![
                TypingSignal { channel_id: 1, is_typing: false },
                TypingSignal { channel_id: 2, is_typing: true },
            ]
        );
    }
}
