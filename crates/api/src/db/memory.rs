//! In-memory repository.
//!
//! Every operation takes the single table lock, so constraint checks and the
//! write that follows them are atomic. Ids come from per-table sequences and
//! are never reused.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use storekeep_core::{ProductId, StoreId, UserId};

use super::{Repository, RepositoryError};
use crate::models::{
    NewProduct, NewStore, NewUser, Product, ProductDetail, ProductPatch, Store, StoreDetail,
    StorePatch, StoreWithOwner, User, UserPatch,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    stores: BTreeMap<StoreId, Store>,
    products: BTreeMap<ProductId, Product>,
    user_seq: i32,
    store_seq: i32,
    product_seq: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn store_of(&self, user_id: UserId) -> Option<&Store> {
        self.stores.values().find(|s| s.user_id == user_id)
    }

    fn require_user(&self, id: UserId) -> Result<&User, RepositoryError> {
        self.users.get(&id).ok_or_else(|| {
            RepositoryError::Invalid(format!("foreign key violation: user {id} does not exist"))
        })
    }

    fn require_store(&self, id: StoreId) -> Result<&Store, RepositoryError> {
        self.stores.get(&id).ok_or_else(|| {
            RepositoryError::Invalid(format!("foreign key violation: store {id} does not exist"))
        })
    }

    fn store_with_owner(&self, store: &Store) -> Option<StoreWithOwner> {
        let user = self.users.get(&store.user_id)?;
        Some(StoreWithOwner {
            store: store.clone(),
            user: user.clone(),
        })
    }

    fn product_detail(&self, product: &Product) -> Option<ProductDetail> {
        let store = self.stores.get(&product.store_id)?;
        Some(ProductDetail {
            product: product.clone(),
            store: self.store_with_owner(store)?,
        })
    }
}

/// Repository holding all records in process memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError> {
        let mut t = self.tables.write().await;
        if t.email_taken(&new.email, None) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let user = User {
            id: UserId::new(next(&mut t.user_seq)),
            name: new.name,
            email: new.email,
            password: new.password,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, RepositoryError> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&id) {
            return Err(RepositoryError::NotFound("user"));
        }
        if let Some(email) = &patch.email
            && t.email_taken(email, Some(id))
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let user = t
            .users
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound("user"))?;
        patch.apply(user);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&id) {
            return Err(RepositoryError::NotFound("user"));
        }
        if let Some(store) = t.store_of(id) {
            return Err(RepositoryError::Invalid(format!(
                "foreign key violation: user {id} still owns store {}",
                store.id
            )));
        }
        t.users.remove(&id);
        Ok(())
    }

    async fn find_store_by_owner(
        &self,
        user_id: UserId,
    ) -> Result<Option<Store>, RepositoryError> {
        Ok(self.tables.read().await.store_of(user_id).cloned())
    }

    async fn create_store(&self, new: NewStore) -> Result<Store, RepositoryError> {
        let mut t = self.tables.write().await;
        t.require_user(new.user_id)?;
        if t.store_of(new.user_id).is_some() {
            return Err(RepositoryError::Conflict(
                "user already has a store".to_owned(),
            ));
        }

        let store = Store {
            id: StoreId::new(next(&mut t.store_seq)),
            name: new.name,
            user_id: new.user_id,
        };
        t.stores.insert(store.id, store.clone());
        Ok(store)
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<StoreDetail>, RepositoryError> {
        let t = self.tables.read().await;
        let Some(owned) = t.stores.get(&id).and_then(|s| t.store_with_owner(s)) else {
            return Ok(None);
        };

        let products = t
            .products
            .values()
            .filter(|p| p.store_id == id)
            .cloned()
            .collect();

        Ok(Some(StoreDetail {
            store: owned.store,
            user: owned.user,
            products,
        }))
    }

    async fn update_store(
        &self,
        id: StoreId,
        patch: StorePatch,
    ) -> Result<Store, RepositoryError> {
        let mut t = self.tables.write().await;
        if !t.stores.contains_key(&id) {
            return Err(RepositoryError::NotFound("store"));
        }
        if let Some(user_id) = patch.user_id {
            t.require_user(user_id)?;
            if t.store_of(user_id).is_some_and(|s| s.id != id) {
                return Err(RepositoryError::Conflict(
                    "user already has a store".to_owned(),
                ));
            }
        }

        let store = t
            .stores
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound("store"))?;
        patch.apply(store);
        Ok(store.clone())
    }

    async fn delete_store(&self, id: StoreId) -> Result<(), RepositoryError> {
        let mut t = self.tables.write().await;
        if !t.stores.contains_key(&id) {
            return Err(RepositoryError::NotFound("store"));
        }
        if t.products.values().any(|p| p.store_id == id) {
            return Err(RepositoryError::Invalid(format!(
                "foreign key violation: store {id} still lists products"
            )));
        }
        t.stores.remove(&id);
        Ok(())
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let mut t = self.tables.write().await;
        t.require_store(new.store_id)?;

        let product = Product {
            id: ProductId::new(next(&mut t.product_seq)),
            name: new.name,
            price: new.price,
            store_id: new.store_id,
        };
        t.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn list_products(&self) -> Result<Vec<ProductDetail>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.products
            .values()
            .filter_map(|p| t.product_detail(p))
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.products.get(&id).and_then(|p| t.product_detail(p)))
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let mut t = self.tables.write().await;
        if !t.products.contains_key(&id) {
            return Err(RepositoryError::NotFound("product"));
        }
        if let Some(store_id) = patch.store_id {
            t.require_store(store_id)?;
        }

        let product = t
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound("product"))?;
        patch.apply(product);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        self.tables
            .write()
            .await
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound("product"))
    }
}
