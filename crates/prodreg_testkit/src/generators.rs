//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random registry inputs and
//! operation sequences, plus a reference model to check them against.

use chrono::{DateTime, Utc};
use prodreg_core::{NewProduct, Product, INITIAL_STATUS};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Strategy for generating product IDs from a small alphabet, so that
/// generated sequences collide on IDs often.
pub fn product_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-D][0-9]?").expect("Invalid regex")
}

/// Strategy for generating free-form field values (never empty).
pub fn field_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9 ]{0,15}").expect("Invalid regex")
}

/// Strategy for generating an optional field: `""` about a third of the time.
pub fn optional_field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        2 => field_strategy(),
    ]
}

/// Strategy for generating registration inputs.
pub fn new_product_strategy() -> impl Strategy<Value = NewProduct> {
    (
        product_id_strategy(),
        field_strategy(),
        field_strategy(),
        field_strategy(),
        field_strategy(),
    )
        .prop_map(|(id, name, owner, description, category)| {
            NewProduct::new(id, name, owner, description, category)
        })
}

/// Strategy for generating partial updates in positional form.
pub fn update_args_strategy() -> impl Strategy<Value = [String; 4]> {
    [
        optional_field_strategy(),
        optional_field_strategy(),
        optional_field_strategy(),
        optional_field_strategy(),
    ]
}

/// A registry call for model-based tests.
#[derive(Debug, Clone)]
pub enum RegistryOperation {
    /// Register a product
    Register(NewProduct),
    /// Modify a product
    Modify {
        /// Product ID
        id: String,
        /// status, owner, description, category
        args: [String; 4],
    },
    /// Transfer a product
    Transfer {
        /// Product ID
        id: String,
        /// New owner
        owner: String,
    },
    /// Retrieve a product
    Retrieve {
        /// Product ID
        id: String,
    },
}

/// Strategy for generating registry operations.
pub fn registry_operation_strategy() -> impl Strategy<Value = RegistryOperation> {
    prop_oneof![
        3 => new_product_strategy().prop_map(RegistryOperation::Register),
        3 => (product_id_strategy(), update_args_strategy())
            .prop_map(|(id, args)| RegistryOperation::Modify { id, args }),
        2 => (product_id_strategy(), optional_field_strategy())
            .prop_map(|(id, owner)| RegistryOperation::Transfer { id, owner }),
        2 => product_id_strategy().prop_map(|id| RegistryOperation::Retrieve { id }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<RegistryOperation>> {
    prop::collection::vec(registry_operation_strategy(), min_ops..max_ops)
}

/// A plain-map reference model of the registry.
///
/// Applies the same rules as the real service without a store or codec.
#[derive(Debug, Default)]
pub struct RegistryModel {
    products: BTreeMap<String, Product>,
}

/// Outcome of a model step, comparable with the real registry's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutcome {
    /// The operation succeeded.
    Ok,
    /// The ID was already taken.
    AlreadyExists,
    /// The ID was not registered.
    NotFound,
}

impl RegistryModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `op` at time `now` and returns what the registry should report.
    pub fn apply(&mut self, op: &RegistryOperation, now: &str) -> ModelOutcome {
        match op {
            RegistryOperation::Register(new) => {
                if self.products.contains_key(&new.id) {
                    return ModelOutcome::AlreadyExists;
                }
                let product = Product {
                    id: new.id.clone(),
                    name: new.name.clone(),
                    status: INITIAL_STATUS.to_owned(),
                    owner: new.owner.clone(),
                    created_at: now.to_owned(),
                    updated_at: now.to_owned(),
                    category: new.category.clone(),
                    description: new.description.clone(),
                };
                self.products.insert(new.id.clone(), product);
                ModelOutcome::Ok
            }
            RegistryOperation::Modify { id, args } => {
                let [status, owner, description, category] = args;
                self.update(id, &[status, owner, description, category], now)
            }
            RegistryOperation::Transfer { id, owner } => {
                let empty = String::new();
                self.update(id, &[&empty, owner, &empty, &empty], now)
            }
            RegistryOperation::Retrieve { id } => {
                if self.products.contains_key(id) {
                    ModelOutcome::Ok
                } else {
                    ModelOutcome::NotFound
                }
            }
        }
    }

    fn update(&mut self, id: &str, fields: &[&String; 4], now: &str) -> ModelOutcome {
        let Some(product) = self.products.get_mut(id) else {
            return ModelOutcome::NotFound;
        };
        let targets = [
            &mut product.status,
            &mut product.owner,
            &mut product.description,
            &mut product.category,
        ];
        for (target, proposed) in targets.into_iter().zip(fields) {
            if !proposed.is_empty() {
                target.clone_from(proposed);
            }
        }
        product.updated_at = now.to_owned();
        ModelOutcome::Ok
    }

    /// Returns the modelled products in ID order.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }
}

/// Parses an RFC3339 timestamp written by the registry.
///
/// # Panics
///
/// Panics if `value` is not RFC3339; registry timestamps always are.
#[must_use]
pub fn parse_rfc3339(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("Registry timestamps are RFC3339")
        .with_timezone(&Utc)
}

/// Proptest configuration for registry suites: few cases, short shrinking.
///
/// Each case drives a whole registry, so the default 256 cases are slow
/// without finding more.
#[must_use]
pub fn quick_config() -> ProptestConfig {
    ProptestConfig {
        cases: 32,
        max_shrink_iters: 100,
        ..ProptestConfig::default()
    }
}
