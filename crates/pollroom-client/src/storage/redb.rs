//! Redb-backed read positions.
//!
//! Survives client restarts. Each store is its own ACID write transaction.

use std::{path::Path, sync::Arc};

use pollroom_core::{ChannelId, MessageId};
use redb::{Database, ReadableTable, TableDefinition};

use super::{ReadPositionStore, StorageError};

/// Table: read_positions
/// Key: channel id
/// Value: newest message id the user has seen
const READ_POSITIONS: TableDefinition<u64, u64> = TableDefinition::new("read_positions");

/// Durable read positions backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbReadPositions {
    db: Arc<Database>,
}

impl RedbReadPositions {
    /// Open or create a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(READ_POSITIONS).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl ReadPositionStore for RedbReadPositions {
    fn load(&self, channel_id: ChannelId) -> Result<Option<MessageId>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table = txn.open_table(READ_POSITIONS).map_err(|e| StorageError::Io(e.to_string()))?;

        let value = table.get(channel_id).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(value.map(|v| v.value()))
    }

    fn store(&self, channel_id: ChannelId, message_id: MessageId) -> Result<bool, StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        let changed = {
            let mut table =
                txn.open_table(READ_POSITIONS).map_err(|e| StorageError::Io(e.to_string()))?;

            let current = table
                .get(channel_id)
                .map_err(|e| StorageError::Io(e.to_string()))?
                .map(|v| v.value());

            if current.is_some_and(|c| c >= message_id) {
                false
            } else {
                table
                    .insert(channel_id, message_id)
                    .map_err(|e| StorageError::Io(e.to_string()))?;
                true
            }
        };

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(changed)
    }

    fn forget(&self, channel_id: ChannelId) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let mut table =
                txn.open_table(READ_POSITIONS).map_err(|e| StorageError::Io(e.to_string()))?;
            table.remove(channel_id).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }
}
