//! Test fixtures and registry helpers.
//!
//! Provides convenience functions for setting up test registries
//! and common test scenarios.

use prodreg_core::{FixedClock, ProductRegistry, RegistryConfig, TxTimestamp};
use prodreg_storage::{FileStore, InMemoryStore, StateStore};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Unix second every fixture clock starts at (2024-05-01T12:00:00Z).
pub const FIXTURE_EPOCH: i64 = 1_714_564_800;

/// RFC3339 rendering of [`FIXTURE_EPOCH`].
pub const FIXTURE_EPOCH_RFC3339: &str = "2024-05-01T12:00:00Z";

/// A registry over an in-memory store with a fixed clock.
pub type MemoryRegistry = ProductRegistry<InMemoryStore, FixedClock>;

/// A test registry with automatic cleanup.
pub struct TestRegistry<S: StateStore> {
    /// The registry instance.
    pub registry: ProductRegistry<S, FixedClock>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestRegistry<InMemoryStore> {
    /// Creates a new in-memory test registry.
    pub fn memory() -> Self {
        Self::memory_with_config(RegistryConfig::default())
    }

    /// Creates a new in-memory test registry with a custom configuration.
    pub fn memory_with_config(config: RegistryConfig) -> Self {
        Self {
            registry: ProductRegistry::with_config(InMemoryStore::new(), fixture_clock(), config),
            _temp_dir: None,
        }
    }
}

impl TestRegistry<FileStore> {
    /// Creates a new file-backed test registry.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open_with_create_dirs(&temp_dir.path().join("registry.db"))
            .expect("Failed to open file store");

        Self {
            registry: ProductRegistry::new(store, fixture_clock()),
            _temp_dir: Some(temp_dir),
        }
    }
}

impl<S: StateStore> TestRegistry<S> {
    /// Returns the store path if file-backed, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir
            .as_ref()
            .map(|d| d.path().join("registry.db"))
    }

    /// Moves the fixture clock forward.
    pub fn tick(&self, by: Duration) {
        self.registry.clock().advance(by);
    }
}

impl<S: StateStore> std::ops::Deref for TestRegistry<S> {
    type Target = ProductRegistry<S, FixedClock>;

    fn deref(&self) -> &Self::Target {
        &self.registry
    }
}

/// Returns a clock set to [`FIXTURE_EPOCH`].
pub fn fixture_clock() -> FixedClock {
    FixedClock::new(TxTimestamp::new(FIXTURE_EPOCH, 0))
}

/// Runs a test with a temporary in-memory registry.
///
/// # Example
///
/// ```rust
/// use prodreg_testkit::with_temp_registry;
///
/// with_temp_registry(|registry| {
///     assert!(registry.list_all().unwrap().is_empty());
/// });
/// ```
pub fn with_temp_registry<F, R>(f: F) -> R
where
    F: FnOnce(&MemoryRegistry) -> R,
{
    let test_registry = TestRegistry::memory();
    f(&test_registry.registry)
}

/// Runs a test with a temporary file-backed registry.
pub fn with_file_registry<F, R>(f: F) -> R
where
    F: FnOnce(&ProductRegistry<FileStore, FixedClock>, &std::path::Path) -> R,
{
    let test_registry = TestRegistry::file();
    let path = test_registry
        .path()
        .expect("File registry should have a path");
    f(&test_registry.registry, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a registry holding `count` products `item-000`, `item-001`, ...
    ///
    /// Product `i` is owned by `owner-{i % 3}`.
    pub fn populated_registry(count: usize) -> TestRegistry<InMemoryStore> {
        let test_registry = TestRegistry::memory();

        for i in 0..count {
            test_registry
                .register(
                    &format!("item-{i:03}"),
                    &format!("Item {i}"),
                    &format!("owner-{}", i % 3),
                    "generated",
                    "fixtures",
                )
                .expect("Failed to register product");
        }

        test_registry
    }

    /// Creates a registry seeded by `initialize`.
    pub fn bootstrapped_registry() -> TestRegistry<InMemoryStore> {
        let test_registry = TestRegistry::memory();
        test_registry
            .initialize()
            .expect("Failed to initialize registry");
        test_registry
    }
}
