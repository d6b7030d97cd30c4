//! Durable read positions.
//!
//! Trait-based abstraction for remembering, per channel, the id of the newest
//! message the user has seen. The trait is synchronous (no async) so the
//! Sans-IO [`crate::Client`] can call it directly from `handle`.

mod memory;
mod redb;

pub use memory::MemoryReadPositions;
use pollroom_core::{ChannelId, MessageId};
use thiserror::Error;

pub use self::redb::RedbReadPositions;

/// Storage errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Underlying database or filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(String),
}

/// Per-channel read position store.
///
/// Must be Clone (shared between the client and its owner), Send + Sync, and
/// synchronous. Implementations share internal state via Arc, so clones see
/// the same positions.
///
/// # Invariants
///
/// - Stored positions never decrease: [`ReadPositionStore::store`] ignores a
///   value lower than or equal to the one already held.
pub trait ReadPositionStore: Clone + Send + Sync + 'static {
    /// Last persisted read position for a channel. `None` if never stored.
    fn load(&self, channel_id: ChannelId) -> Result<Option<MessageId>, StorageError>;

    /// Persist a read position.
    ///
    /// Returns `true` if the stored value changed.
    fn store(&self, channel_id: ChannelId, message_id: MessageId) -> Result<bool, StorageError>;

    /// Forget a channel (after the channel is deleted).
    fn forget(&self, channel_id: ChannelId) -> Result<(), StorageError>;
}
