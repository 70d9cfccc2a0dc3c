//! Named-function invocation surface.
//!
//! Host transports call the registry by function name with an ordered list
//! of string arguments. [`Invocation`] parses such a call into a typed
//! [`Operation`], and [`ProductRegistry::invoke`] runs it.

use crate::clock::TxClock;
use crate::error::{RegistryError, RegistryResult};
use crate::product::{NewProduct, Product, ProductUpdate};
use crate::registry::ProductRegistry;
use prodreg_storage::StateStore;
use serde::Serialize;
use tracing::debug;

/// A registry operation with its arguments bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Seed the bootstrap products.
    Initialize,
    /// Register a new product.
    Register(NewProduct),
    /// Partially update a product.
    Modify {
        /// Product ID.
        id: String,
        /// Fields to change.
        update: ProductUpdate,
    },
    /// Assign a new owner.
    TransferOwnership {
        /// Product ID.
        id: String,
        /// The new owner.
        new_owner: String,
    },
    /// Fetch one product.
    Retrieve {
        /// Product ID.
        id: String,
    },
    /// Check whether a product exists.
    Exists {
        /// Product ID.
        id: String,
    },
    /// Fetch all products.
    ListAll,
}

impl Operation {
    /// Returns the canonical function name.
    #[must_use]
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::Initialize => "Initialize",
            Self::Register(_) => "Register",
            Self::Modify { .. } => "Modify",
            Self::TransferOwnership { .. } => "TransferOwnership",
            Self::Retrieve { .. } => "Retrieve",
            Self::Exists { .. } => "Exists",
            Self::ListAll => "ListAll",
        }
    }

    /// Returns `true` if the operation may write to the store.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Initialize
                | Self::Register(_)
                | Self::Modify { .. }
                | Self::TransferOwnership { .. }
        )
    }
}

/// A function call as delivered by a host transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Function name.
    pub function: String,
    /// Ordered string arguments.
    pub args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation.
    pub fn new<I, A>(function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Binds the arguments to a typed [`Operation`].
    ///
    /// Both the short names (`Register`, `Retrieve`, ...) and the ledger's
    /// long names (`RegisterProduct`, `RetrieveProduct`,
    /// `CheckProductExistence`, ...) are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownFunction`] for an unrecognised name
    /// and [`RegistryError::InvalidArguments`] for a wrong argument count.
    pub fn parse(&self) -> RegistryResult<Operation> {
        let args = &self.args;
        let op = match self.function.as_str() {
            "Initialize" | "InitializeLedger" => {
                self.expect_args("Initialize", 0)?;
                Operation::Initialize
            }
            "Register" | "RegisterProduct" => {
                self.expect_args("Register", 5)?;
                Operation::Register(NewProduct::new(
                    args[0].as_str(),
                    args[1].as_str(),
                    args[2].as_str(),
                    args[3].as_str(),
                    args[4].as_str(),
                ))
            }
            "Modify" | "ModifyProduct" => {
                self.expect_args("Modify", 5)?;
                Operation::Modify {
                    id: args[0].clone(),
                    update: ProductUpdate::from_args(&args[1], &args[2], &args[3], &args[4]),
                }
            }
            "TransferOwnership" => {
                self.expect_args("TransferOwnership", 2)?;
                Operation::TransferOwnership {
                    id: args[0].clone(),
                    new_owner: args[1].clone(),
                }
            }
            "Retrieve" | "RetrieveProduct" => {
                self.expect_args("Retrieve", 1)?;
                Operation::Retrieve {
                    id: args[0].clone(),
                }
            }
            "Exists" | "CheckProductExistence" => {
                self.expect_args("Exists", 1)?;
                Operation::Exists {
                    id: args[0].clone(),
                }
            }
            "ListAll" | "ListAllProducts" => {
                self.expect_args("ListAll", 0)?;
                Operation::ListAll
            }
            other => return Err(RegistryError::unknown_function(other)),
        };
        Ok(op)
    }

    fn expect_args(&self, function: &'static str, expected: usize) -> RegistryResult<()> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(RegistryError::InvalidArguments {
                function,
                expected,
                actual: self.args.len(),
            })
        }
    }
}

/// The result of an invoked operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Mutations return nothing.
    Empty,
    /// A single product.
    Product(Product),
    /// An existence check.
    Exists(bool),
    /// A product listing.
    Products(Vec<Product>),
}

impl Response {
    /// Encodes the response as the transport payload.
    ///
    /// `Empty` encodes to no bytes; everything else is JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Serialization`] if encoding fails.
    pub fn to_payload(&self) -> RegistryResult<Vec<u8>> {
        match self {
            Self::Empty => Ok(Vec::new()),
            other => serde_json::to_vec(other)
                .map_err(|e| RegistryError::serialization("response", e)),
        }
    }
}

impl<S: StateStore, C: TxClock> ProductRegistry<S, C> {
    /// Parses and runs a named-function call.
    ///
    /// # Errors
    ///
    /// Returns invocation errors from [`Invocation::parse`] or any error of
    /// the operation itself.
    pub fn invoke(&self, invocation: &Invocation) -> RegistryResult<Response> {
        let op = invocation.parse()?;
        debug!(function = op.function_name(), "invoking registry function");
        self.execute(op)
    }

    /// Runs a typed operation.
    ///
    /// # Errors
    ///
    /// Returns any error of the operation.
    pub fn execute(&self, op: Operation) -> RegistryResult<Response> {
        match op {
            Operation::Initialize => self.initialize().map(|()| Response::Empty),
            Operation::Register(new) => self.register_product(new).map(|()| Response::Empty),
            Operation::Modify { id, update } => {
                self.modify_product(&id, &update).map(|()| Response::Empty)
            }
            Operation::TransferOwnership { id, new_owner } => self
                .transfer_ownership(&id, &new_owner)
                .map(|()| Response::Empty),
            Operation::Retrieve { id } => self.retrieve(&id).map(Response::Product),
            Operation::Exists { id } => self.exists(&id).map(Response::Exists),
            Operation::ListAll => self.list_all().map(Response::Products),
        }
    }
}
