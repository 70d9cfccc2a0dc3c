//! The product registry service.

use crate::clock::TxClock;
use crate::codec::RecordCodec;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::product::{NewProduct, Product, ProductUpdate};
use prodreg_storage::StateStore;
use tracing::{debug, info, warn};

/// Records product lifecycle events against a key-value state store.
///
/// The registry keeps no state of its own: every operation is one
/// read-modify-write (or read) against the store, stamped with the
/// transaction time from the clock. Atomicity of a single operation under
/// concurrent callers is the store's responsibility; the registry takes
/// no locks.
///
/// Records are keyed by product ID, so registration and lookup share one
/// namespace and there is at most one record per ID.
pub struct ProductRegistry<S, C> {
    store: S,
    clock: C,
    config: RegistryConfig,
}

impl<S: StateStore, C: TxClock> ProductRegistry<S, C> {
    /// Creates a registry with the default configuration.
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(store, clock, RegistryConfig::default())
    }

    /// Creates a registry with an explicit configuration.
    pub fn with_config(store: S, clock: C, config: RegistryConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the transaction clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Seeds the store with the configured bootstrap products.
    ///
    /// Existing records with the same IDs are overwritten; the seed content
    /// is deterministic, so re-running after a partial failure is safe.
    /// All seeds share one transaction timestamp.
    pub fn initialize(&self) -> RegistryResult<()> {
        let now = self.now()?;
        for seed in &self.config.bootstrap {
            let product =
                Product::manufacture_with_status(seed.clone(), &self.config.initial_status, &now);
            self.save(&product)?;
        }
        info!(count = self.config.bootstrap.len(), "initialized registry");
        Ok(())
    }

    /// Registers a new product with the configured initial status
    /// (`"Manufactured"` by default).
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::AlreadyExists`] if `id` is taken.
    pub fn register(
        &self,
        id: &str,
        name: &str,
        owner: &str,
        description: &str,
        category: &str,
    ) -> RegistryResult<()> {
        self.register_product(NewProduct::new(id, name, owner, description, category))
    }

    /// Registers a new product.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::AlreadyExists`] if the ID is taken.
    pub fn register_product(&self, new: NewProduct) -> RegistryResult<()> {
        if self.exists(&new.id)? {
            warn!(product_id = %new.id, "rejected duplicate registration");
            return Err(RegistryError::already_exists(new.id));
        }

        let now = self.now()?;
        let product = Product::manufacture_with_status(new, &self.config.initial_status, &now);
        self.save(&product)?;
        info!(product_id = %product.id, owner = %product.owner, "registered product");
        Ok(())
    }

    /// Updates a product's mutable fields. Empty arguments leave the
    /// corresponding field unchanged.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::NotFound`] if `id` is not registered.
    pub fn modify(
        &self,
        id: &str,
        status: &str,
        owner: &str,
        description: &str,
        category: &str,
    ) -> RegistryResult<()> {
        self.modify_product(
            id,
            &ProductUpdate::from_args(status, owner, description, category),
        )
    }

    /// Applies a partial update to a product and refreshes its `updated_at`.
    ///
    /// The timestamp moves even if `update` changes nothing.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::NotFound`] if `id` is not registered.
    pub fn modify_product(&self, id: &str, update: &ProductUpdate) -> RegistryResult<()> {
        let Some(mut product) = self.load(id)? else {
            warn!(product_id = %id, "rejected update of unknown product");
            return Err(RegistryError::not_found(id));
        };

        let now = self.now()?;
        product.apply(update, &now);
        self.save(&product)?;
        info!(
            product_id = %id,
            status = %product.status,
            owner = %product.owner,
            "updated product"
        );
        Ok(())
    }

    /// Assigns a new owner. Equivalent to `modify(id, "", new_owner, "", "")`.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::NotFound`] if `id` is not registered.
    pub fn transfer_ownership(&self, id: &str, new_owner: &str) -> RegistryResult<()> {
        self.modify_product(id, &ProductUpdate::transfer(new_owner))
    }

    /// Returns the product stored under `id`.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::NotFound`] if `id` is not registered.
    pub fn retrieve(&self, id: &str) -> RegistryResult<Product> {
        self.load(id)?.ok_or_else(|| RegistryError::not_found(id))
    }

    /// Returns `true` if a product is registered under `id`.
    ///
    /// A missing product is not an error; only store failures are.
    pub fn exists(&self, id: &str) -> RegistryResult<bool> {
        Ok(self.store.get(id)?.is_some())
    }

    /// Returns every product in the store, ordered by ID.
    ///
    /// Each call re-scans the whole keyspace. An empty store yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Serialization`] if any stored value is
    /// not a product record.
    pub fn list_all(&self) -> RegistryResult<Vec<Product>> {
        let entries = self.store.range_scan("", "")?;
        let mut products = Vec::with_capacity(entries.len());
        for (key, bytes) in entries {
            products.push(Product::decode(&key, &bytes)?);
        }
        debug!(count = products.len(), "listed products");
        Ok(products)
    }

    fn now(&self) -> RegistryResult<String> {
        let ts = self.clock.tx_timestamp()?;
        Ok(ts.format(self.config.timestamp_precision)?)
    }

    fn load(&self, id: &str) -> RegistryResult<Option<Product>> {
        debug!(product_id = %id, "loading product");
        match self.store.get(id)? {
            Some(bytes) => Ok(Some(Product::decode(id, &bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, product: &Product) -> RegistryResult<()> {
        let bytes = product.encode()?;
        self.store.put(product.record_key(), &bytes)?;
        Ok(())
    }
}

impl<S, C> std::fmt::Debug for ProductRegistry<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
