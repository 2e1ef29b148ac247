use brc_types::Uid;

use crate::error::StoreResult;

/// Process-wide mapping from UID to blob.
///
/// All implementations must satisfy these invariants:
/// - `get` after a completed `put` (with no write in between) returns exactly
///   the bytes written, including the empty blob.
/// - A value is never visible half-written.
/// - A missing key is `Ok(None)`. `Err` means the engine failed.
///
/// Calls are synchronous and may block on disk I/O; async callers must move
/// them off the scheduler thread.
pub trait BlobStore: Send + Sync {
    /// Look up the blob stored under `uid`.
    fn get(&self, uid: &Uid) -> StoreResult<Option<Vec<u8>>>;

    /// Store `blob` under `uid`, replacing any previous value.
    fn put(&self, uid: &Uid, blob: &[u8]) -> StoreResult<()>;

    /// Check whether a record exists for `uid`.
    ///
    /// Default implementation reads the whole value.
    fn contains(&self, uid: &Uid) -> StoreResult<bool> {
        Ok(self.get(uid)?.is_some())
    }

    /// Number of records in the store.
    fn len(&self) -> StoreResult<u64>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
