//! State store trait definition.

use crate::error::StorageResult;
use std::sync::Arc;

/// A key and its stored value, as yielded by [`StateStore::range_scan`].
pub type KeyValue = (String, Vec<u8>);

/// A key-value state store.
///
/// State stores are **opaque byte stores** keyed by strings. The registry
/// owns all value interpretation - stores do not understand product records.
///
/// # Invariants
///
/// - `get` returns exactly the bytes most recently `put` under that key
/// - `get` returns `Ok(None)` for an absent key; absence is not an error
/// - `range_scan` yields keys in lexicographic (byte-wise) order
/// - A single `put` either fully replaces the value or fails
/// - Stores must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent state
pub trait StateStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be performed.
    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Returns all entries with `start <= key < end` in key order.
    ///
    /// An empty `start` is unbounded below and an empty `end` is unbounded
    /// above, so `range_scan("", "")` enumerates the whole keyspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be scanned.
    fn range_scan(&self, start: &str, end: &str) -> StorageResult<Vec<KeyValue>>;

    /// Returns the number of keys in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be scanned.
    fn len(&self) -> StorageResult<usize> {
        Ok(self.range_scan("", "")?.len())
    }

    /// Returns `true` if the store holds no keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be scanned.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        (**self).put(key, value)
    }

    fn range_scan(&self, start: &str, end: &str) -> StorageResult<Vec<KeyValue>> {
        (**self).range_scan(start, end)
    }
}

impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        (**self).put(key, value)
    }

    fn range_scan(&self, start: &str, end: &str) -> StorageResult<Vec<KeyValue>> {
        (**self).range_scan(start, end)
    }
}

impl<T: StateStore + ?Sized> StateStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        (**self).put(key, value)
    }

    fn range_scan(&self, start: &str, end: &str) -> StorageResult<Vec<KeyValue>> {
        (**self).range_scan(start, end)
    }
}

/// Converts scan bounds into a `BTreeMap` range, treating `""` as unbounded.
///
/// Returns `None` when the range is empty (`start >= end` with both bounded).
pub(crate) fn scan_bounds<'a>(
    start: &'a str,
    end: &'a str,
) -> Option<(std::ops::Bound<&'a str>, std::ops::Bound<&'a str>)> {
    use std::ops::Bound;

    if !start.is_empty() && !end.is_empty() && start >= end {
        return None;
    }
    let lower = if start.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start)
    };
    let upper = if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end)
    };
    Some((lower, upper))
}
