//! Registry configuration.

use crate::clock::TimestampPrecision;
use crate::product::{NewProduct, INITIAL_STATUS};

/// Configuration for a [`crate::ProductRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Status given to newly registered and bootstrapped products.
    pub initial_status: String,

    /// Products written by `initialize`.
    pub bootstrap: Vec<NewProduct>,

    /// Precision of `created_date` / `updated_date` values.
    pub timestamp_precision: TimestampPrecision,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_status: INITIAL_STATUS.to_owned(),
            bootstrap: default_bootstrap(),
            timestamp_precision: TimestampPrecision::Secs,
        }
    }
}

impl RegistryConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status given to new products.
    #[must_use]
    pub fn initial_status(mut self, status: impl Into<String>) -> Self {
        self.initial_status = status.into();
        self
    }

    /// Replaces the bootstrap product set.
    #[must_use]
    pub fn bootstrap(mut self, products: Vec<NewProduct>) -> Self {
        self.bootstrap = products;
        self
    }

    /// Sets the timestamp precision.
    #[must_use]
    pub const fn timestamp_precision(mut self, precision: TimestampPrecision) -> Self {
        self.timestamp_precision = precision;
        self
    }
}

/// The two sample products seeded by `initialize`.
fn default_bootstrap() -> Vec<NewProduct> {
    vec![
        NewProduct::new(
            "prod1",
            "Gaming Laptop",
            "TechCorp",
            "A high-performance gaming laptop",
            "Electronics",
        ),
        NewProduct::new(
            "prod2",
            "5G Smartphone",
            "MobileCo",
            "Latest 5G-enabled smartphone",
            "Electronics",
        ),
    ]
}
