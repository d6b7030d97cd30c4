//! Client
//!
//! Action-based sync engine for the Pollroom chat client. Turns a stream of
//! stateless poll responses into an ordered, deduplicated message view and
//! tracks what the user has and has not seen.
//!
//! # Architecture
//!
//! The client is Sans-IO. It receives events ([`ClientEvent`]), processes
//! them through pure state machine logic, and returns actions
//! ([`ClientAction`]) for the caller to execute. Requests to the collaborator
//! service leave as [`ClientAction::Send`] and come back as
//! [`ClientEvent::Response`]; time only moves when the caller says so.
//!
//! # Components
//!
//! - [`Client`]: top-level state machine for the active channel
//! - [`SyncLoop`]: poll schedule and stale-response rejection
//! - [`MessageStore`]: full-replace merge and two-phase deletes
//! - [`ReadTracker`]: read position, unread count, unread divider
//! - [`ScrollAnchor`]: at-bottom classification and auto-advance
//! - [`TypingDebouncer`]: rate-limited typing signals
//! - [`ChannelDirectory`]: joined channels and admin flags
//! - [`PresenceTracker`]: online names and the active meeting
//! - [`ReadPositionStore`]: durable per-channel read positions
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, [`transport::HttpService`] implements
//! [`ChatService`] over HTTP/JSON.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod anchor;
mod client;
mod directory;
mod error;
mod event;
mod presence;
mod read;
mod request;
mod service;
pub mod storage;
mod store;
mod sync;
mod typing;

#[cfg(feature = "transport")]
pub mod transport;

pub use anchor::{AnchorDecision, ScrollAnchor, Viewport};
pub use client::{Client, ClientIdentity, Timeline, TimelineEntry};
pub use directory::ChannelDirectory;
pub use error::{ClientError, ServiceError};
pub use event::{ClientAction, ClientEvent, Notice};
pub use pollroom_core::{Body, BodyKind, Channel, ChannelId, Message, MessageId, Timestamp};
pub use presence::PresenceTracker;
pub use read::{Divider, FirstFetch, ReadTracker};
pub use request::{Request, RequestId, RequestTag, Response};
pub use service::ChatService;
pub use storage::{MemoryReadPositions, ReadPositionStore, RedbReadPositions, StorageError};
pub use store::{MergeOutcome, MessageStore};
pub use sync::{Acceptance, PollKind, StaleReason, SyncConfig, SyncLoop};
pub use typing::{TypingDebouncer, TypingSignal};
