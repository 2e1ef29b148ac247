//! redb-based blob storage backend.
//!
//! [`RedbBlobStore`] keeps every record in a single `redb` table inside the
//! configured store directory.

use std::path::{Path, PathBuf};

use brc_types::Uid;
use redb::{Builder, Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::config::{Durability, StoreConfig};
use crate::error::StoreResult;
use crate::traits::BlobStore;

/// Key: UID bytes. Value: blob bytes.
const BLOBS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("blobs");

/// File name of the database inside the store directory.
pub const DB_FILE_NAME: &str = "brc.redb";

/// Durable blob store backed by `redb`.
///
/// Every `put` runs in its own write transaction, so a value is replaced
/// atomically. `redb` admits one writer at a time; readers work from a
/// snapshot and never block on it.
pub struct RedbBlobStore {
    db: Database,
    path: PathBuf,
    durability: Durability,
}

impl RedbBlobStore {
    /// Open or create the store inside `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P, config: &StoreConfig) -> StoreResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(DB_FILE_NAME);

        let db = Builder::new()
            .set_cache_size(config.cache_size())
            .create(&path)?;

        // Create the table up front so readers never see it missing.
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BLOBS_TABLE)?;
        }
        write_txn.commit()?;

        debug!(
            path = %path.display(),
            cache_size = config.cache_size(),
            "opened redb blob store"
        );
        Ok(Self {
            db,
            path,
            durability: config.durability,
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobStore for RedbBlobStore {
    fn get(&self, uid: &Uid) -> StoreResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BLOBS_TABLE)?;
        match table.get(uid.as_bytes())? {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn put(&self, uid: &Uid, blob: &[u8]) -> StoreResult<()> {
        let mut write_txn = self.db.begin_write()?;
        write_txn.set_durability(self.durability.into());
        {
            let mut table = write_txn.open_table(BLOBS_TABLE)?;
            table.insert(uid.as_bytes(), blob)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn contains(&self, uid: &Uid) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BLOBS_TABLE)?;
        Ok(table.get(uid.as_bytes())?.is_some())
    }

    fn len(&self) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BLOBS_TABLE)?;
        let mut count = 0u64;
        for entry in table.iter()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}

impl std::fmt::Debug for RedbBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBlobStore")
            .field("path", &self.path)
            .field("durability", &self.durability)
            .finish()
    }
}
