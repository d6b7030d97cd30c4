//! Properties every rendered frame of a Pollroom client must satisfy.
//!
//! A frame is captured as a [`ClientSnapshot`]: the App's view (timeline,
//! channels, scroll offset, typing line), the read positions persisted so
//! far and, when the caller can reach the sync engine, its anchor state.
//! [`SystemSnapshot`] groups one snapshot per simulated user.
//!
//! The [`SimDriver`](crate::SimDriver) checks its registry on every render;
//! runtime tests add the engine's anchor after a run settles:
//!
//! ```ignore
//! let frame = ClientSnapshot::from_app(runtime.app()).with_client(runtime.bridge().client());
//! InvariantRegistry::standard().assert_all(&SystemSnapshot::single(frame), "after run");
//! ```

mod checks;
mod snapshot;

pub use checks::{
    ActiveChannelListed, AnchorFollowsView, ReadPositionMonotonic, ScrollWithinBounds,
    TimelineOrdered, TypingExcludesSelf,
};
pub use snapshot::{AnchorSnapshot, ClientSnapshot, SystemSnapshot};

/// Outcome of one check.
pub type InvariantResult = Result<(), Violation>;

/// A broken property, named after the check that found it.
#[derive(Debug, Clone)]
pub struct Violation {
    /// [`Invariant::name`] of the failing check.
    pub invariant: &'static str,
    /// Which client and which values.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// One property of a frame.
pub trait Invariant: Send + Sync {
    /// Short snake_case name used in violation reports.
    fn name(&self) -> &'static str;

    /// Inspect every client in `state`; report the first offender.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Set of checks run against each frame.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// No checks.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// The checks every simulated client must pass:
    ///
    /// - [`TimelineOrdered`]: ascending ids, active channel only
    /// - [`ActiveChannelListed`]: the active channel is in the channel list
    /// - [`ReadPositionMonotonic`]: persisted positions never go back
    /// - [`ScrollWithinBounds`]: the offset stays inside the log
    /// - [`TypingExcludesSelf`]: the local name never shows as typing
    /// - [`AnchorFollowsView`]: App offset and engine anchor agree
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(TimelineOrdered);
        registry.add(ActiveChannelListed);
        registry.add(ReadPositionMonotonic);
        registry.add(ScrollWithinBounds);
        registry.add(TypingExcludesSelf);
        registry.add(AnchorFollowsView);
        registry
    }

    /// Register another check.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Run every check; collect all violations rather than stopping early.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// [`check_all`](Self::check_all), panicking with `context` and every
    /// violation on failure.
    #[allow(clippy::panic, reason = "test harness reports violations by panicking")]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("frame check failed {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// No checks registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
