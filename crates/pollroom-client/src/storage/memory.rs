#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use pollroom_core::{ChannelId, MessageId};

use super::{ReadPositionStore, StorageError};

/// In-memory read positions for tests and ephemeral sessions.
///
/// Positions are lost when the last clone is dropped. A poisoned mutex is
/// reported as [`StorageError::Io`].
#[derive(Clone, Default)]
pub struct MemoryReadPositions {
    inner: Arc<Mutex<HashMap<ChannelId, MessageId>>>,
}

impl MemoryReadPositions {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with positions.
    pub fn with_positions(positions: impl IntoIterator<Item = (ChannelId, MessageId)>) -> Self {
        Self { inner: Arc::new(Mutex::new(positions.into_iter().collect())) }
    }
}

impl ReadPositionStore for MemoryReadPositions {
    fn load(&self, channel_id: ChannelId) -> Result<Option<MessageId>, StorageError> {
        let inner = self.inner.lock().map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(inner.get(&channel_id).copied())
    }

    fn store(&self, channel_id: ChannelId, message_id: MessageId) -> Result<bool, StorageError> {
        let mut inner = self.inner.lock().map_err(|e| StorageError::Io(e.to_string()))?;
        let slot = inner.entry(channel_id).or_insert(0);
        if message_id > *slot {
            *slot = message_id;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn forget(&self, channel_id: ChannelId) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().map_err(|e| StorageError::Io(e.to_string()))?;
        inner.remove(&channel_id);
        Ok(())
    }
}
