//! Instant abstraction for time-driven state machines.
//!
//! The sync loop and typing debouncer never read the clock themselves; time
//! is passed in. Generic over the instant type so production can use real
//! time and simulation can use a paused virtual clock.

use std::{
    ops::{Add, Sub},
    time::Duration,
};

/// Monotonic instant usable by the sans-IO state machines.
///
/// Implemented for every type with the right arithmetic, notably
/// `std::time::Instant` and `tokio::time::Instant`.
pub trait Timestamp:
    Copy + Ord + Send + Sync + Add<Duration, Output = Self> + Sub<Output = Duration> + 'static
{
}

impl<T> Timestamp for T where
    T: Copy + Ord + Send + Sync + Add<Duration, Output = T> + Sub<Output = Duration> + 'static
{
}
