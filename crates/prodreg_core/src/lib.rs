//! # Product Registry Core
//!
//! Entity model and registry service for tracking products through their
//! lifecycle (manufacture, status changes, ownership transfers).
//!
//! This crate provides:
//! - The [`Product`] record and its partial-update merge rule
//! - A deterministic transaction-time oracle ([`TxClock`])
//! - The [`ProductRegistry`] service over any [`StateStore`]
//! - A named-function invocation surface ([`Invocation`])
//!
//! The registry is stateless between calls: every operation reads and
//! writes through the store it was built with.
//!
//! ## Example
//!
//! ```rust
//! use prodreg_core::{FixedClock, ProductRegistry, TxTimestamp};
//! use prodreg_storage::InMemoryStore;
//!
//! let registry = ProductRegistry::new(
//!     InMemoryStore::new(),
//!     FixedClock::new(TxTimestamp::new(1_700_000_000, 0)),
//! );
//! registry.register("p1", "Widget", "Acme", "desc", "cat").unwrap();
//! registry.transfer_ownership("p1", "Globex").unwrap();
//! assert_eq!(registry.retrieve("p1").unwrap().owner, "Globex");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod codec;
mod config;
mod error;
mod invoke;
mod product;
mod registry;

pub use clock::{ClockError, FixedClock, SystemClock, TimestampPrecision, TxClock, TxTimestamp};
pub use codec::RecordCodec;
pub use config::RegistryConfig;
pub use error::{ErrorKind, RegistryError, RegistryResult};
pub use invoke::{Invocation, Operation, Response};
pub use product::{NewProduct, Product, ProductUpdate, INITIAL_STATUS};
pub use registry::ProductRegistry;

pub use prodreg_storage::{StateStore, StorageError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
