//! Store and clock doubles that fail on demand.

use parking_lot::Mutex;
use prodreg_core::{ClockError, TxClock, TxTimestamp};
use prodreg_storage::{InMemoryStore, KeyValue, StateStore, StorageError, StorageResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Which store calls a [`FaultyStore`] rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultMode {
    /// Every call succeeds.
    #[default]
    Healthy,
    /// Only `get` fails.
    FailGets,
    /// Only `put` fails.
    FailPuts,
    /// Only `range_scan` fails.
    FailScans,
    /// Puts succeed until the given number of puts has been made.
    FailPutsAfter(usize),
    /// Every call fails.
    FailAll,
}

/// An in-memory store whose calls can be made to fail.
///
/// Counts reads and writes so tests can assert that a rejected operation
/// never touched the store.
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: InMemoryStore,
    mode: Mutex<FaultMode>,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl FaultyStore {
    /// Creates a store with the given fault mode.
    #[must_use]
    pub fn new(mode: FaultMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            ..Self::default()
        }
    }

    /// Changes the fault mode.
    pub fn set_mode(&self, mode: FaultMode) {
        *self.mode.lock() = mode;
    }

    /// Returns the number of successful puts.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Returns the number of get calls, failed or not.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    fn mode(&self) -> FaultMode {
        *self.mode.lock()
    }
}

fn injected(op: &str) -> StorageError {
    StorageError::unavailable(format!("injected {op} failure"))
}

impl StateStore for FaultyStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        match self.mode() {
            FaultMode::FailGets | FaultMode::FailAll => Err(injected("get")),
            _ => self.inner.get(key),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        match self.mode() {
            FaultMode::FailPuts | FaultMode::FailAll => return Err(injected("put")),
            FaultMode::FailPutsAfter(limit) if self.put_count() >= limit => {
                return Err(injected("put"))
            }
            _ => {}
        }
        self.inner.put(key, value)?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> StorageResult<Vec<KeyValue>> {
        match self.mode() {
            FaultMode::FailScans | FaultMode::FailAll => Err(injected("scan")),
            _ => self.inner.range_scan(start, end),
        }
    }
}

/// A clock that always fails, like a call outside a transaction context.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClock;

impl TxClock for UnavailableClock {
    fn tx_timestamp(&self) -> Result<TxTimestamp, ClockError> {
        Err(ClockError::unavailable("no transaction context"))
    }
}

/// A clock that hands out a fixed sequence of timestamps, then fails.
#[derive(Debug)]
pub struct ScriptedClock {
    ticks: Mutex<std::collections::VecDeque<TxTimestamp>>,
}

impl ScriptedClock {
    /// Creates a clock that returns `ticks` in order.
    pub fn new(ticks: impl IntoIterator<Item = TxTimestamp>) -> Self {
        Self {
            ticks: Mutex::new(ticks.into_iter().collect()),
        }
    }

    /// Returns how many timestamps are left.
    pub fn remaining(&self) -> usize {
        self.ticks.lock().len()
    }
}

impl TxClock for ScriptedClock {
    fn tx_timestamp(&self) -> Result<TxTimestamp, ClockError> {
        self.ticks
            .lock()
            .pop_front()
            .ok_or_else(|| ClockError::unavailable("scripted clock exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_store_passes_through() {
        let store = FaultyStore::new(FaultMode::Healthy);
        store.put("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.put_count(), 1);
        assert_eq!(store.get_count(), 1);
    }

    #[test]
    fn fail_puts_after_limit() {
        let store = FaultyStore::new(FaultMode::FailPutsAfter(1));
        store.put("a", b"1").unwrap();
        assert!(store.put("b", b"2").is_err());
        assert_eq!(store.inner().len().unwrap(), 1);
    }

    #[test]
    fn fail_all_rejects_everything() {
        let store = FaultyStore::new(FaultMode::FailAll);
        assert!(store.get("k").is_err());
        assert!(store.put("k", b"v").is_err());
        assert!(store.range_scan("", "").is_err());
    }

    #[test]
    fn scripted_clock_exhausts() {
        let clock = ScriptedClock::new([TxTimestamp::new(1, 0)]);
        assert_eq!(clock.tx_timestamp().unwrap(), TxTimestamp::new(1, 0));
        assert_eq!(clock.remaining(), 0);
        assert!(clock.tx_timestamp().is_err());
    }
}
