//! The product record and its update rules.

use serde::{Deserialize, Serialize};

/// Status given to every newly registered product.
pub const INITIAL_STATUS: &str = "Manufactured";

/// A product tracked by the registry.
///
/// The product ID doubles as the store key, so there is exactly one record
/// per ID. `name` and `id` never change after registration; `created_at` is
/// set once and `updated_at` moves on every modification.
///
/// Field names on the wire follow the ledger's JSON layout
/// (`product_id`, `current_owner`, `created_date`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, immutable product ID.
    #[serde(rename = "product_id")]
    pub id: String,
    /// Product name, fixed at registration.
    #[serde(rename = "product_name")]
    pub name: String,
    /// Free-form lifecycle label (`"Manufactured"`, `"In Transit"`, ...).
    #[serde(rename = "product_status")]
    pub status: String,
    /// Current custodian.
    #[serde(rename = "current_owner")]
    pub owner: String,
    /// RFC3339 registration time.
    #[serde(rename = "created_date")]
    pub created_at: String,
    /// RFC3339 time of the last mutation.
    #[serde(rename = "updated_date")]
    pub updated_at: String,
    /// Free-form category.
    #[serde(rename = "product_category")]
    pub category: String,
    /// Free-form description.
    #[serde(rename = "product_description")]
    pub description: String,
}

/// The caller-supplied fields of a product about to be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Product ID (store key).
    pub id: String,
    /// Product name.
    pub name: String,
    /// Initial owner.
    pub owner: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
}

impl NewProduct {
    /// Creates a new product description.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner: owner.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

/// A partial update to a product's mutable fields.
///
/// `None` leaves the field unchanged. On the string-argument surface an
/// empty string means "leave unchanged", see [`ProductUpdate::from_args`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    /// New status.
    pub status: Option<String>,
    /// New owner.
    pub owner: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
}

impl ProductUpdate {
    /// Builds an update from positional arguments, treating `""` as absent.
    #[must_use]
    pub fn from_args(status: &str, owner: &str, description: &str, category: &str) -> Self {
        Self {
            status: non_empty(status),
            owner: non_empty(owner),
            description: non_empty(description),
            category: non_empty(category),
        }
    }

    /// The update applied by an ownership transfer.
    #[must_use]
    pub fn transfer(new_owner: &str) -> Self {
        Self::from_args("", new_owner, "", "")
    }

    /// Sets the new status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the new owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Sets the new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the new category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns `true` if no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.owner.is_none()
            && self.description.is_none()
            && self.category.is_none()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

impl Product {
    /// Creates a freshly manufactured product stamped at `now`.
    #[must_use]
    pub fn manufacture(new: NewProduct, now: &str) -> Self {
        Self::manufacture_with_status(new, INITIAL_STATUS, now)
    }

    /// Creates a new product with an explicit initial status.
    #[must_use]
    pub fn manufacture_with_status(new: NewProduct, status: &str, now: &str) -> Self {
        Self {
            id: new.id,
            name: new.name,
            status: status.to_owned(),
            owner: new.owner,
            created_at: now.to_owned(),
            updated_at: now.to_owned(),
            category: new.category,
            description: new.description,
        }
    }

    /// Merges `update` into this product and stamps `updated_at` with `now`.
    ///
    /// `updated_at` moves even when `update` is empty: every accepted
    /// modification counts as a touch.
    pub fn apply(&mut self, update: &ProductUpdate, now: &str) {
        if let Some(status) = &update.status {
            self.status.clone_from(status);
        }
        if let Some(owner) = &update.owner {
            self.owner.clone_from(owner);
        }
        if let Some(description) = &update.description {
            self.description.clone_from(description);
        }
        if let Some(category) = &update.category {
            self.category.clone_from(category);
        }
        self.updated_at = now.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T0: &str = "2024-05-01T12:00:00Z";
    const T1: &str = "2024-05-01T12:00:05Z";

    fn widget() -> Product {
        Product::manufacture(NewProduct::new("p1", "Widget", "Acme", "desc", "cat"), T0)
    }

    #[test]
    fn manufacture_sets_initial_status_and_timestamps() {
        let product = widget();
        assert_eq!(product.status, INITIAL_STATUS);
        assert_eq!(product.created_at, T0);
        assert_eq!(product.updated_at, T0);
        assert_eq!(product.owner, "Acme");
    }

    #[test]
    fn manufacture_with_custom_status() {
        let new = NewProduct::new("p1", "Widget", "Acme", "desc", "cat");
        let product = Product::manufacture_with_status(new, "Assembled", T0);
        assert_eq!(product.status, "Assembled");
        assert_eq!(product.created_at, T0);
    }

    #[test]
    fn apply_replaces_only_present_fields() {
        let mut product = widget();
        product.apply(&ProductUpdate::from_args("Shipped", "", "", ""), T1);

        assert_eq!(product.status, "Shipped");
        assert_eq!(product.owner, "Acme");
        assert_eq!(product.description, "desc");
        assert_eq!(product.category, "cat");
        assert_eq!(product.created_at, T0);
        assert_eq!(product.updated_at, T1);
    }

    #[test]
    fn empty_update_still_touches() {
        let mut product = widget();
        let update = ProductUpdate::from_args("", "", "", "");
        assert!(update.is_empty());

        product.apply(&update, T1);
        assert_eq!(product.updated_at, T1);
        assert_eq!(product.status, INITIAL_STATUS);
    }

    #[test]
    fn transfer_is_owner_only_update() {
        assert_eq!(
            ProductUpdate::transfer("Globex"),
            ProductUpdate::default().with_owner("Globex")
        );
        assert!(ProductUpdate::transfer("").is_empty());
    }

    #[test]
    fn wire_names() {
        let json = serde_json::to_value(widget()).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "created_date",
                "current_owner",
                "product_category",
                "product_description",
                "product_id",
                "product_name",
                "product_status",
                "updated_date",
            ]
        );
        assert_eq!(obj["current_owner"], "Acme");
    }

    proptest! {
        #[test]
        fn apply_matches_field_rule(
            status in "[A-Za-z ]{0,8}",
            owner in "[A-Za-z]{0,8}",
            description in "[a-z ]{0,12}",
            category in "[a-z]{0,6}",
        ) {
            let before = widget();
            let mut after = before.clone();
            after.apply(&ProductUpdate::from_args(&status, &owner, &description, &category), T1);

            let pick = |proposed: &str, old: &str| {
                if proposed.is_empty() { old.to_owned() } else { proposed.to_owned() }
            };
            prop_assert_eq!(&after.status, &pick(&status, &before.status));
            prop_assert_eq!(&after.owner, &pick(&owner, &before.owner));
            prop_assert_eq!(&after.description, &pick(&description, &before.description));
            prop_assert_eq!(&after.category, &pick(&category, &before.category));
            prop_assert_eq!(&after.id, &before.id);
            prop_assert_eq!(&after.name, &before.name);
            prop_assert_eq!(&after.created_at, &before.created_at);
            prop_assert_eq!(after.updated_at.as_str(), T1);
        }
    }
}
