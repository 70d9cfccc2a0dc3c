//! File-based state store for persistent state.

use crate::error::{StorageError, StorageResult};
use crate::store::{scan_bounds, KeyValue, StateStore};
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Magic bytes at the start of every record.
pub const RECORD_MAGIC: &[u8; 4] = b"PRGS";

/// Size of a record header: magic (4) + key length (4) + value length (4).
pub const RECORD_HEADER_SIZE: usize = 12;

/// A file-based state store.
///
/// Every `put` appends one record to the file:
///
/// ```text
/// | magic "PRGS" | key_len u32 LE | value_len u32 LE | key bytes | value bytes |
/// ```
///
/// On open the log is replayed into an in-memory index; a later record for
/// the same key replaces an earlier one. A torn record at the end of the
/// file (from a crash mid-append) is discarded and truncated away.
///
/// # Failed writes
///
/// If an append fails partway, the partial record is truncated away before
/// the error is returned, so the log stays replayable. If that truncation
/// fails too, the store stops accepting writes: every later `put`, `flush`,
/// `sync` and `compact` returns [`StorageError::Closed`]. Reads keep serving
/// the last acknowledged state.
///
/// # Durability
///
/// - `flush()` calls `File::flush()` to push data to the OS
/// - `sync()` calls `File::sync_all()` to ensure data is on disk
///
/// # Locking
///
/// The file is held under an exclusive advisory lock for the lifetime of
/// the store. A second `open` of the same path fails with
/// [`StorageError::Locked`].
///
/// # Example
///
/// ```no_run
/// use prodreg_storage::{StateStore, FileStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("registry.db")).unwrap();
/// store.put("prod1", b"{}").unwrap();
/// store.sync().unwrap();  // Ensure data is durable
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    log: Mutex<RecordLog<File>>,
    index: RwLock<BTreeMap<String, Vec<u8>>>,
}

/// Compaction statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactStats {
    /// Records in the log before compaction.
    pub records_before: usize,
    /// Records in the log after compaction (one per live key).
    pub records_after: usize,
    /// Log size before compaction.
    pub bytes_before: u64,
    /// Log size after compaction.
    pub bytes_after: u64,
}

impl FileStore {
    /// Opens or creates a file store at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is locked by another
    /// process, or contains a corrupted record before its tail.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let replayed = replay(&data)?;
        if replayed.valid_len < data.len() as u64 {
            warn!(
                path = %path.display(),
                discarded = data.len() as u64 - replayed.valid_len,
                "discarding torn record at end of store"
            );
            file.set_len(replayed.valid_len)?;
            file.sync_all()?;
        }
        debug!(
            path = %path.display(),
            keys = replayed.index.len(),
            records = replayed.records,
            "opened file store"
        );

        Ok(Self {
            path: path.to_path_buf(),
            log: Mutex::new(RecordLog::new(file, replayed.valid_len, replayed.records)),
            index: RwLock::new(replayed.index),
        })
    }

    /// Opens or creates a file store, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the store cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of records in the log, superseded ones included.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.log.lock().records
    }

    /// Flushes all pending writes to the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails, or
    /// [`StorageError::Closed`] after an unrecoverable write failure.
    pub fn flush(&self) -> StorageResult<()> {
        let mut log = self.log.lock();
        log.check_open()?;
        log.file.flush()?;
        Ok(())
    }

    /// Syncs all data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails, or
    /// [`StorageError::Closed`] after an unrecoverable write failure.
    pub fn sync(&self) -> StorageResult<()> {
        let mut log = self.log.lock();
        log.check_open()?;
        log.file.flush()?;
        log.file.sync_all()?;
        Ok(())
    }

    /// Rewrites the log with one record per live key.
    ///
    /// Every update appends a full record, so the log only grows; this drops
    /// the superseded records. The new log is written and synced beside the
    /// old one, then renamed over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the new log cannot be written or renamed into
    /// place. The old log is left untouched in that case.
    pub fn compact(&self) -> StorageResult<CompactStats> {
        let mut log = self.log.lock();
        log.check_open()?;
        let index = self.index.read();

        let mut data = Vec::new();
        for (key, value) in index.iter() {
            data.extend_from_slice(&encode_record(key, value)?);
        }

        let temp_path = self.path.with_extension("compact");
        let file = match write_compacted(&temp_path, &data) {
            Ok(file) => file,
            Err(err) => {
                let _ = std::fs::remove_file(&temp_path);
                return Err(err);
            }
        };
        if let Err(err) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(err.into());
        }

        let stats = CompactStats {
            records_before: log.records,
            records_after: index.len(),
            bytes_before: log.end,
            bytes_after: data.len() as u64,
        };
        *log = RecordLog::new(file, stats.bytes_after, stats.records_after);
        info!(
            path = %self.path.display(),
            records_before = stats.records_before,
            records_after = stats.records_after,
            bytes_before = stats.bytes_before,
            bytes_after = stats.bytes_after,
            "compacted file store"
        );
        Ok(stats)
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.index.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let record = encode_record(key, value)?;

        // Hold the log lock across the index update so concurrent puts
        // land in the index in the same order as in the log.
        let mut log = self.log.lock();
        log.append(&record)?;
        self.index.write().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> StorageResult<Vec<KeyValue>> {
        let Some(bounds) = scan_bounds(start, end) else {
            return Ok(Vec::new());
        };
        let index = self.index.read();
        Ok(index
            .range::<str, _>(bounds)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.index.read().len())
    }
}

/// File operations the record log needs.
trait LogFile: Write + Seek {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl LogFile for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// The write side of the store: the file plus the end of its valid prefix.
#[derive(Debug)]
struct RecordLog<F> {
    file: F,
    end: u64,
    records: usize,
    poisoned: bool,
}

impl<F: LogFile> RecordLog<F> {
    fn new(file: F, end: u64, records: usize) -> Self {
        Self {
            file,
            end,
            records,
            poisoned: false,
        }
    }

    fn check_open(&self) -> StorageResult<()> {
        if self.poisoned {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    /// Appends one encoded record at the end of the valid prefix.
    fn append(&mut self, record: &[u8]) -> StorageResult<()> {
        self.check_open()?;
        self.file.seek(SeekFrom::Start(self.end))?;
        if let Err(err) = self.file.write_all(record) {
            match self.file.truncate_to(self.end) {
                Ok(()) => warn!(error = %err, end = self.end, "rolled back partial record"),
                Err(rollback) => {
                    error!(
                        error = %err,
                        rollback_error = %rollback,
                        "failed to roll back partial record; store closed for writes"
                    );
                    self.poisoned = true;
                }
            }
            return Err(err.into());
        }
        self.end += record.len() as u64;
        self.records += 1;
        Ok(())
    }
}

fn write_compacted(path: &Path, data: &[u8]) -> StorageResult<File> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    if file.try_lock_exclusive().is_err() {
        return Err(StorageError::Locked);
    }
    file.write_all(data)?;
    file.sync_all()?;
    Ok(file)
}

fn encode_record(key: &str, value: &[u8]) -> StorageResult<Vec<u8>> {
    let key_len = u32::try_from(key.len())
        .map_err(|_| StorageError::unavailable(format!("key too long: {} bytes", key.len())))?;
    let value_len = u32::try_from(value.len()).map_err(|_| {
        StorageError::unavailable(format!("value too long: {} bytes", value.len()))
    })?;

    let mut record = Vec::with_capacity(RECORD_HEADER_SIZE + key.len() + value.len());
    record.extend_from_slice(RECORD_MAGIC);
    record.extend_from_slice(&key_len.to_le_bytes());
    record.extend_from_slice(&value_len.to_le_bytes());
    record.extend_from_slice(key.as_bytes());
    record.extend_from_slice(value);
    Ok(record)
}

/// The result of replaying a record log.
struct Replayed {
    index: BTreeMap<String, Vec<u8>>,
    records: usize,
    /// Length of the valid prefix of the log.
    valid_len: u64,
}

fn replay(data: &[u8]) -> StorageResult<Replayed> {
    let mut index = BTreeMap::new();
    let mut records = 0;
    let mut offset = 0usize;

    while offset < data.len() {
        let Some(header) = data.get(offset..offset + RECORD_HEADER_SIZE) else {
            break;
        };
        if &header[0..4] != RECORD_MAGIC {
            return Err(StorageError::corrupted(offset as u64, "bad record magic"));
        }
        let key_len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let value_len =
            u32::from_le_bytes([header[8], header[9], header[10], header[11]]) as usize;

        let key_start = offset + RECORD_HEADER_SIZE;
        let value_start = key_start + key_len;
        let record_end = value_start + value_len;
        if record_end > data.len() {
            break;
        }

        let key = std::str::from_utf8(&data[key_start..value_start])
            .map_err(|_| StorageError::corrupted(offset as u64, "key is not valid UTF-8"))?;
        index.insert(key.to_owned(), data[value_start..record_end].to_vec());
        records += 1;
        offset = record_end;
    }

    Ok(Replayed {
        index,
        records,
        valid_len: offset as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");

        let store = FileStore::open(&path).unwrap();
        assert!(store.is_empty().unwrap());
        assert!(path.exists());
    }

    #[test]
    fn file_put_and_get() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("state.db")).unwrap();

        store.put("prod1", b"hello").unwrap();
        store.put("prod2", b"world").unwrap();

        assert_eq!(store.get("prod1").unwrap(), Some(b"hello".to_vec()));
        assert_eq!(store.get("prod2").unwrap(), Some(b"world".to_vec()));
        assert!(store.get("prod3").unwrap().is_none());
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");

        {
            let store = FileStore::open(&path).unwrap();
            store.put("b", b"first").unwrap();
            store.put("a", b"other").unwrap();
            store.put("b", b"second").unwrap();
            store.sync().unwrap();
        }

        {
            let store = FileStore::open(&path).unwrap();
            assert_eq!(store.len().unwrap(), 2);
            assert_eq!(store.get("b").unwrap(), Some(b"second".to_vec()));

            let keys: Vec<String> = store
                .range_scan("", "")
                .unwrap()
                .into_iter()
                .map(|(k, _)| k)
                .collect();
            assert_eq!(keys, vec!["a", "b"]);
        }
    }

    #[test]
    fn file_torn_tail_is_discarded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");

        {
            let store = FileStore::open(&path).unwrap();
            store.put("good", b"value").unwrap();
            store.sync().unwrap();
        }
        let good_len = std::fs::metadata(&path).unwrap().len();

        // Simulate a crash halfway through the next append.
        let record = encode_record("torn", b"never finished").unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&record[..record.len() - 3]).unwrap();
        drop(file);

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("good").unwrap(), Some(b"value".to_vec()));
        assert!(store.get("torn").unwrap().is_none());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), good_len);
    }

    #[test]
    fn file_bad_magic_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");
        std::fs::write(&path, b"XXXXsome garbage that is long enough").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StorageError::Corrupted { offset: 0, .. })));
    }

    #[test]
    fn file_second_open_is_locked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");

        let _first = FileStore::open(&path).unwrap();
        let second = FileStore::open(&path);
        assert!(matches!(second, Err(StorageError::Locked)));
    }

    #[test]
    fn file_range_scan_bounds() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("state.db")).unwrap();
        for key in ["p1", "p2", "p3"] {
            store.put(key, b"x").unwrap();
        }

        let keys: Vec<String> = store
            .range_scan("p2", "")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["p2", "p3"]);
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("state.db");

        let store = FileStore::open_with_create_dirs(&path).unwrap();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.path(), path);
    }

    #[test]
    fn file_flush_and_sync() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("state.db")).unwrap();
        store.put("k", b"v").unwrap();

        assert!(store.flush().is_ok());
        assert!(store.sync().is_ok());
    }

    /// An in-memory log file that accepts a fixed number of bytes and then
    /// fails every write.
    struct FlakyFile {
        inner: std::io::Cursor<Vec<u8>>,
        write_budget: usize,
        fail_truncate: bool,
    }

    impl FlakyFile {
        fn new(write_budget: usize) -> Self {
            Self {
                inner: std::io::Cursor::new(Vec::new()),
                write_budget,
                fail_truncate: false,
            }
        }

        fn bytes(&self) -> &[u8] {
            self.inner.get_ref()
        }
    }

    impl Write for FlakyFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.write_budget == 0 {
                return Err(io::Error::other("no space left on device"));
            }
            let n = buf.len().min(self.write_budget);
            self.write_budget -= n;
            self.inner.write(&buf[..n])
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for FlakyFile {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    impl LogFile for FlakyFile {
        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            if self.fail_truncate {
                return Err(io::Error::other("I/O error"));
            }
            self.inner.get_mut().truncate(len as usize);
            Ok(())
        }
    }

    #[test]
    fn log_failed_append_is_rolled_back() {
        let first = encode_record("a", b"alpha").unwrap();
        let second = encode_record("b", b"bravo").unwrap();
        let third = encode_record("c", b"charlie").unwrap();

        // Enough budget for the first record and half of the second.
        let mut log = RecordLog::new(FlakyFile::new(first.len() + second.len() / 2), 0, 0);
        log.append(&first).unwrap();

        let err = log.append(&second).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(log.file.bytes(), &first[..]);
        assert_eq!(log.end, first.len() as u64);
        assert_eq!(log.records, 1);

        // Space frees up; the next append lands right after the first record.
        log.file.write_budget = usize::MAX;
        log.append(&third).unwrap();

        let replayed = replay(log.file.bytes()).unwrap();
        assert_eq!(replayed.valid_len, log.file.bytes().len() as u64);
        assert_eq!(replayed.records, 2);
        assert_eq!(replayed.index.get("a"), Some(&b"alpha".to_vec()));
        assert_eq!(replayed.index.get("c"), Some(&b"charlie".to_vec()));
        assert!(!replayed.index.contains_key("b"));
    }

    #[test]
    fn log_failed_rollback_closes_for_writes() {
        let record = encode_record("a", b"alpha").unwrap();
        let mut file = FlakyFile::new(record.len() / 2);
        file.fail_truncate = true;
        let mut log = RecordLog::new(file, 0, 0);

        assert!(matches!(log.append(&record), Err(StorageError::Io(_))));
        assert!(log.poisoned);

        log.file.write_budget = usize::MAX;
        assert!(matches!(log.append(&record), Err(StorageError::Closed)));
        assert!(matches!(log.check_open(), Err(StorageError::Closed)));
    }

    #[test]
    fn file_put_after_reopen_appends_at_valid_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");

        {
            let store = FileStore::open(&path).unwrap();
            store.put("a", b"alpha").unwrap();
            store.sync().unwrap();
        }
        let record = encode_record("torn", b"never finished").unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&record[..record.len() - 3]).unwrap();
        drop(file);

        {
            let store = FileStore::open(&path).unwrap();
            store.put("c", b"charlie").unwrap();
            store.sync().unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"alpha".to_vec()));
        assert_eq!(store.get("c").unwrap(), Some(b"charlie".to_vec()));
        assert_eq!(store.record_count(), 2);
    }

    #[test]
    fn file_compact_keeps_latest_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");

        {
            let store = FileStore::open(&path).unwrap();
            for round in 0..5u8 {
                store.put("p1", &[round]).unwrap();
                store.put("p2", &[round, round]).unwrap();
            }
            assert_eq!(store.record_count(), 10);

            let stats = store.compact().unwrap();
            assert_eq!(stats.records_before, 10);
            assert_eq!(stats.records_after, 2);
            assert!(stats.bytes_after < stats.bytes_before);
            assert_eq!(std::fs::metadata(&path).unwrap().len(), stats.bytes_after);
            assert!(!path.with_extension("compact").exists());

            // The store keeps working on the compacted log.
            store.put("p3", b"new").unwrap();
            assert_eq!(store.get("p1").unwrap(), Some(vec![4]));
            store.sync().unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.record_count(), 3);
        assert_eq!(store.get("p1").unwrap(), Some(vec![4]));
        assert_eq!(store.get("p2").unwrap(), Some(vec![4, 4]));
        assert_eq!(store.get("p3").unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn file_compact_holds_lock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");

        let store = FileStore::open(&path).unwrap();
        store.put("k", b"v").unwrap();
        store.compact().unwrap();

        assert!(matches!(FileStore::open(&path), Err(StorageError::Locked)));
    }
}
