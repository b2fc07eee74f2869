//! Store domain types.

use serde::{Deserialize, Serialize};

use storekeep_core::{StoreId, UserId};

use super::{Product, User};

/// A store, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Display name.
    pub name: String,
    /// Owning user. Unique: a user has at most one store.
    pub user_id: UserId,
}

/// A store with its owner expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreWithOwner {
    #[serde(flatten)]
    pub store: Store,
    pub user: User,
}

/// A store with its owner and its products expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDetail {
    #[serde(flatten)]
    pub store: Store,
    pub user: User,
    pub products: Vec<Product>,
}

/// Fields for inserting a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub user_id: UserId,
}

/// Partial update of a store. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorePatch {
    pub name: Option<String>,
    pub user_id: Option<UserId>,
}

impl StorePatch {
    /// Apply the set fields to a store in place.
    pub fn apply(self, store: &mut Store) {
        if let Some(name) = self.name {
            store.name = name;
        }
        if let Some(user_id) = self.user_id {
            store.user_id = user_id;
        }
    }
}
