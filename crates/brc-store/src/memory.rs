use std::collections::BTreeMap;
use std::sync::RwLock;

use brc_types::Uid;

use crate::error::StoreResult;
use crate::traits::BlobStore;

/// In-memory, `BTreeMap`-based blob store.
///
/// Intended for tests and embedding. Records are held behind a `RwLock` and
/// cloned on read/write. Nothing survives the process.
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<Uid, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, uid: &Uid) -> StoreResult<Option<Vec<u8>>> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.get(uid).cloned())
    }

    fn put(&self, uid: &Uid, blob: &[u8]) -> StoreResult<()> {
        let mut map = self.blobs.write().expect("lock poisoned");
        map.insert(uid.clone(), blob.to_vec());
        Ok(())
    }

    fn contains(&self, uid: &Uid) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(uid))
    }

    fn len(&self) -> StoreResult<u64> {
        Ok(self.blobs.read().expect("lock poisoned").len() as u64)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.blobs.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryBlobStore")
            .field("record_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn uid(s: &str) -> Uid {
        Uid::new(s).unwrap()
    }

    #[test]
    fn write_and_read() {
        let store = InMemoryBlobStore::new();
        store.put(&uid("alice"), b"hello").unwrap();
        assert_eq!(store.get(&uid("alice")).unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn read_missing() {
        let store = InMemoryBlobStore::new();
        assert_eq!(store.get(&uid("bob")).unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn absent_and_empty_differ() {
        let store = InMemoryBlobStore::new();
        store.put(&uid("empty"), b"").unwrap();
        assert_eq!(store.get(&uid("empty")).unwrap(), Some(Vec::new()));
        assert_eq!(store.get(&uid("never")).unwrap(), None);
    }

    #[test]
    fn padded_uid_addresses_same_record() {
        let store = InMemoryBlobStore::new();
        store.put(&uid(" alice "), b"x").unwrap();
        assert!(store.contains(&uid("alice")).unwrap());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn last_writer_wins() {
        let store = InMemoryBlobStore::new();
        store.put(&uid("alice"), b"first").unwrap();
        store.put(&uid("alice"), b"second!").unwrap();
        assert_eq!(store.get(&uid("alice")).unwrap(), Some(b"second!".to_vec()));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn concurrent_writers_never_interleave() {
        let store = Arc::new(InMemoryBlobStore::new());
        let a = vec![b'a'; 4096];
        let b = vec![b'b'; 4096];

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let blob = if i % 2 == 0 { a.clone() } else { b.clone() };
                std::thread::spawn(move || store.put(&uid("race"), &blob).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let stored = store.get(&uid("race")).unwrap().unwrap();
        assert!(stored == a || stored == b);
    }

    #[test]
    fn debug_shows_count() {
        let store = InMemoryBlobStore::new();
        store.put(&uid("a"), b"1").unwrap();
        assert_eq!(format!("{store:?}"), "InMemoryBlobStore { record_count: 1 }");
    }
}
