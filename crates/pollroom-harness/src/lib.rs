//! Deterministic simulation harness for Pollroom client testing.
//!
//! In-process implementations of the [`pollroom_client::ChatService`] and
//! [`pollroom_app::Driver`] traits so the production [`pollroom_app::Runtime`]
//! runs unchanged under tokio's paused clock.
//!
//! # Service Simulation
//!
//! [`SimService`] keeps channels, messages, typing sets and meetings in
//! memory. Latency, jitter and failures are drawn from a seeded RNG, so a
//! run that reorders or drops poll results is reproducible from its seed.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties of each rendered frame: timeline
//! order, channel selection, read-position monotonicity, scroll bounds, the
//! typing line, and agreement between the scroll offset and the engine's
//! anchor. [`InvariantRegistry::standard()`] registers all of them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_service;

pub use invariants::{
    ActiveChannelListed, AnchorFollowsView, AnchorSnapshot, ClientSnapshot, Invariant,
    InvariantRegistry, InvariantResult, ReadPositionMonotonic, ScrollWithinBounds, SystemSnapshot,
    TimelineOrdered, TypingExcludesSelf, Violation,
};
pub use sim_driver::{SimDriver, SimInput, SimObserver};
pub use sim_service::{SimConfig, SimService};
