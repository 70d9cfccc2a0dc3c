//! Error types for registry operations.

use crate::clock::ClockError;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur in registry operations.
///
/// Every error is terminal for the operation that produced it. Nothing is
/// retried internally; the caller decides whether to retry the whole
/// transaction.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A product with this ID is already registered.
    #[error("product with ID {id} already exists")]
    AlreadyExists {
        /// The duplicate product ID.
        id: String,
    },

    /// No product is registered under this ID.
    #[error("product with ID {id} does not exist")]
    NotFound {
        /// The missing product ID.
        id: String,
    },

    /// The transaction timestamp could not be obtained.
    #[error("unable to retrieve transaction timestamp: {0}")]
    TimestampUnavailable(#[from] ClockError),

    /// The state store failed.
    #[error("store error: {0}")]
    Storage(#[from] prodreg_storage::StorageError),

    /// A record could not be encoded or decoded.
    #[error("serialization failure for {context}: {source}")]
    Serialization {
        /// What was being (de)serialized.
        context: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The invoked function name is not part of the registry surface.
    #[error("unknown function: {name}")]
    UnknownFunction {
        /// The requested function name.
        name: String,
    },

    /// The invoked function was given the wrong number of arguments.
    #[error("{function} expects {expected} argument(s), got {actual}")]
    InvalidArguments {
        /// The function being invoked.
        function: &'static str,
        /// Number of arguments the function takes.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },
}

/// Coarse classification of a [`RegistryError`].
///
/// Lets callers branch on the failure kind, e.g. treat a duplicate
/// registration differently from a transient store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Register on a present key.
    AlreadyExists,
    /// Modify, transfer or retrieve on an absent key.
    NotFound,
    /// The timestamp oracle failed.
    TimestampUnavailable,
    /// The underlying get, put or scan failed.
    StoreUnavailable,
    /// Malformed stored bytes, or a record that could not be encoded.
    SerializationFailure,
    /// Unknown function name or wrong argument count.
    InvalidInvocation,
}

impl RegistryError {
    /// Creates an already-exists error.
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Creates a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a serialization error.
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Creates an unknown function error.
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction { name: name.into() }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::TimestampUnavailable(_) => ErrorKind::TimestampUnavailable,
            Self::Storage(_) => ErrorKind::StoreUnavailable,
            Self::Serialization { .. } => ErrorKind::SerializationFailure,
            Self::UnknownFunction { .. } | Self::InvalidArguments { .. } => {
                ErrorKind::InvalidInvocation
            }
        }
    }
}
