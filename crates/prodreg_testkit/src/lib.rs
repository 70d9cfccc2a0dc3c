//! # Product Registry Testkit
//!
//! Test utilities for the product registry.
//!
//! This crate provides:
//! - Test fixtures and registry helpers
//! - Store and clock doubles that fail on demand
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use prodreg_testkit::prelude::*;
//!
//! with_temp_registry(|registry| {
//!     registry.register("p1", "Widget", "Acme", "desc", "cat").unwrap();
//!     assert!(registry.exists("p1").unwrap());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod doubles;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::doubles::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use doubles::*;
pub use fixtures::*;
pub use generators::*;
