//! # Product Registry Storage
//!
//! State store trait and implementations for the product registry.
//!
//! This crate provides the lowest-level storage abstraction the registry
//! needs from its host. State stores are **opaque key-value stores** - they
//! map string keys to byte values and do not interpret the values.
//!
//! ## Design Principles
//!
//! - Stores are simple key-value maps (get, put, range scan)
//! - No knowledge of product records or their encoding
//! - Must be `Send + Sync` so one store can serve many callers
//! - Per-operation atomicity is the store's responsibility, not the caller's
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral state
//! - [`FileStore`] - For persistent state using an append-only record log
//!
//! ## Example
//!
//! ```rust
//! use prodreg_storage::{StateStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! store.put("prod1", b"hello world").unwrap();
//! let data = store.get("prod1").unwrap();
//! assert_eq!(data.as_deref(), Some(&b"hello world"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::{CompactStats, FileStore, RECORD_HEADER_SIZE, RECORD_MAGIC};
pub use memory::InMemoryStore;
pub use store::{KeyValue, StateStore};
