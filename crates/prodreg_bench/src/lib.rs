//! Benchmark utilities.

use prodreg_core::{FixedClock, NewProduct, ProductRegistry};
use prodreg_storage::{InMemoryStore, StateStore};

/// Generates `count` registration inputs with IDs `bench-000000`, ...
pub fn generate_products(count: usize) -> Vec<NewProduct> {
    (0..count)
        .map(|i| {
            NewProduct::new(
                format!("bench-{i:06}"),
                format!("Product {i}"),
                format!("owner-{}", i % 16),
                "benchmark fixture",
                "bench",
            )
        })
        .collect()
}

/// Builds a registry over `store` holding `count` products.
pub fn populated_registry<S: StateStore>(
    store: S,
    count: usize,
) -> ProductRegistry<S, FixedClock> {
    let registry = ProductRegistry::new(store, FixedClock::at_unix(1_714_564_800));
    for product in generate_products(count) {
        registry
            .register_product(product)
            .expect("benchmark fixture registration");
    }
    registry
}

/// Builds an in-memory registry holding `count` products.
pub fn populated_memory_registry(count: usize) -> ProductRegistry<InMemoryStore, FixedClock> {
    populated_registry(InMemoryStore::new(), count)
}
