//! In-memory state store for testing.

use crate::error::StorageResult;
use crate::store::{scan_bounds, KeyValue, StateStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory state store.
///
/// This store keeps all entries in an ordered map and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral registries that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads. Each `put`
/// takes the write lock, so a single write is atomic.
///
/// # Example
///
/// ```rust
/// use prodreg_storage::{StateStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// store.put("b", b"2").unwrap();
/// store.put("a", b"1").unwrap();
/// let keys: Vec<String> = store
///     .range_scan("", "")
///     .unwrap()
///     .into_iter()
///     .map(|(k, _)| k)
///     .collect();
/// assert_eq!(keys, vec!["a", "b"]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store with pre-existing entries.
    ///
    /// Useful for seeding corrupt or foreign values in tests.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Returns a copy of all entries in key order.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.entries.read().clone()
    }

    /// Removes all entries from the store.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl StateStore for InMemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.entries.write().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> StorageResult<Vec<KeyValue>> {
        let Some(bounds) = scan_bounds(start, end) else {
            return Ok(Vec::new());
        };
        let entries = self.entries.read();
        Ok(entries
            .range::<str, _>(bounds)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.entries.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(entries: &[KeyValue]) -> Vec<&str> {
        entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn memory_new_is_empty() {
        let store = InMemoryStore::new();
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.is_empty().unwrap());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn memory_get_absent_is_none() {
        let store = InMemoryStore::new();
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn memory_put_then_get() {
        let store = InMemoryStore::new();
        store.put("prod1", b"hello").unwrap();
        assert_eq!(store.get("prod1").unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn memory_put_replaces_value() {
        let store = InMemoryStore::new();
        store.put("prod1", b"first").unwrap();
        store.put("prod1", b"second").unwrap();

        assert_eq!(store.get("prod1").unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn memory_full_scan_is_lexicographic() {
        let store = InMemoryStore::new();
        for key in ["C", "A", "B", "AA"] {
            store.put(key, key.as_bytes()).unwrap();
        }

        let all = store.range_scan("", "").unwrap();
        assert_eq!(keys(&all), vec!["A", "AA", "B", "C"]);
    }

    #[test]
    fn memory_scan_start_inclusive_end_exclusive() {
        let store = InMemoryStore::with_entries([("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);

        let slice = store.range_scan("b", "d").unwrap();
        assert_eq!(keys(&slice), vec!["b", "c"]);

        let tail = store.range_scan("c", "").unwrap();
        assert_eq!(keys(&tail), vec!["c", "d"]);

        let head = store.range_scan("", "b").unwrap();
        assert_eq!(keys(&head), vec!["a"]);
    }

    #[test]
    fn memory_scan_inverted_range_is_empty() {
        let store = InMemoryStore::with_entries([("a", "1"), ("b", "2")]);
        assert!(store.range_scan("b", "a").unwrap().is_empty());
        assert!(store.range_scan("b", "b").unwrap().is_empty());
    }

    #[test]
    fn memory_scan_empty_store() {
        let store = InMemoryStore::new();
        assert!(store.range_scan("", "").unwrap().is_empty());
    }

    #[test]
    fn memory_clear() {
        let store = InMemoryStore::with_entries([("a", "1")]);
        store.clear();
        assert!(store.is_empty().unwrap());
    }

    proptest::proptest! {
        #[test]
        fn memory_scan_matches_sorted_filter(
            stored in proptest::collection::btree_set("[a-e]{0,3}", 0..24),
            start in "[a-e]{0,2}",
            end in "[a-e]{0,2}",
        ) {
            let store = InMemoryStore::new();
            for key in &stored {
                store.put(key, key.as_bytes()).unwrap();
            }

            let expected: Vec<&str> = stored
                .iter()
                .map(String::as_str)
                .filter(|k| start.is_empty() || *k >= start.as_str())
                .filter(|k| end.is_empty() || *k < end.as_str())
                .collect();
            let scanned = store.range_scan(&start, &end).unwrap();
            proptest::prop_assert_eq!(keys(&scanned), expected);
        }
    }

    #[test]
    fn memory_shared_through_reference() {
        fn write_via<S: StateStore>(store: S) {
            store.put("k", b"v").unwrap();
        }

        let store = InMemoryStore::new();
        write_via(&store);
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
    }
}
