//! Record codec trait for values kept in the state store.

use crate::error::{RegistryError, RegistryResult};
use crate::product::Product;

/// Trait for types that can be stored as records in a state store.
///
/// Implementors must provide:
/// - `record_key()`: Returns the store key the record lives under
/// - `encode()`: Serializes to the stored byte form
/// - `decode()`: Deserializes from the stored byte form
pub trait RecordCodec: Sized {
    /// Returns the store key for this record.
    fn record_key(&self) -> &str;

    /// Encodes the record to bytes.
    ///
    /// Identical records must produce identical bytes.
    fn encode(&self) -> RegistryResult<Vec<u8>>;

    /// Decodes a record read from `key`.
    ///
    /// `key` is only used for error context.
    fn decode(key: &str, bytes: &[u8]) -> RegistryResult<Self>;
}

impl RecordCodec for Product {
    fn record_key(&self) -> &str {
        &self.id
    }

    fn encode(&self) -> RegistryResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| RegistryError::serialization(format!("product {}", self.id), e))
    }

    fn decode(key: &str, bytes: &[u8]) -> RegistryResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| RegistryError::serialization(format!("product {key}"), e))
    }
}
