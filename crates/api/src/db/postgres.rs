//! `PostgreSQL` repository.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate
//! builds without a live database. Partial updates use `COALESCE` so a
//! `NULL` bind leaves the column unchanged.

use async_trait::async_trait;
use sqlx::PgPool;

use storekeep_core::{Price, ProductId, StoreId, UserId};

use super::{Repository, RepositoryError};
use crate::models::{
    NewProduct, NewStore, NewUser, Product, ProductDetail, ProductPatch, Store, StoreDetail,
    StorePatch, StoreWithOwner, User, UserPatch,
};

const EMAIL_TAKEN: &str = "email already exists";
const STORE_TAKEN: &str = "user already has a store";

/// Repository backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a new repository over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map constraint violations to typed repository errors.
fn classify(err: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Invalid(db_err.message().to_owned());
        }
    }
    RepositoryError::Database(err)
}

/// Store joined with its owner.
#[derive(sqlx::FromRow)]
struct StoreOwnerRow {
    id: StoreId,
    name: String,
    user_id: UserId,
    user_name: String,
    user_email: String,
    user_password: String,
}

impl From<StoreOwnerRow> for StoreWithOwner {
    fn from(row: StoreOwnerRow) -> Self {
        Self {
            store: Store {
                id: row.id,
                name: row.name,
                user_id: row.user_id,
            },
            user: User {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                password: row.user_password,
            },
        }
    }
}

/// Product joined with its store and the store's owner.
#[derive(sqlx::FromRow)]
struct ProductDetailRow {
    id: ProductId,
    name: String,
    price: Price,
    store_id: StoreId,
    store_name: String,
    user_id: UserId,
    user_name: String,
    user_email: String,
    user_password: String,
}

impl From<ProductDetailRow> for ProductDetail {
    fn from(row: ProductDetailRow) -> Self {
        Self {
            product: Product {
                id: row.id,
                name: row.name,
                price: row.price,
                store_id: row.store_id,
            },
            store: StoreOwnerRow {
                id: row.store_id,
                name: row.store_name,
                user_id: row.user_id,
                user_name: row.user_name,
                user_email: row.user_email,
                user_password: row.user_password,
            }
            .into(),
        }
    }
}

const STORE_OWNER_SELECT: &str = r"
    SELECT s.id, s.name, s.user_id,
           u.name AS user_name, u.email AS user_email, u.password AS user_password
    FROM stores s
    JOIN users u ON u.id = s.user_id
";

const PRODUCT_DETAIL_SELECT: &str = r"
    SELECT p.id, p.name, p.price, p.store_id,
           s.name AS store_name, s.user_id,
           u.name AS user_name, u.email AS user_email, u.password AS user_password
    FROM products p
    JOIN stores s ON s.id = p.store_id
    JOIN users u ON u.id = s.user_id
";

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password
            ",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, EMAIL_TAKEN))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password = COALESCE($4, password)
            WHERE id = $1
            RETURNING id, name, email, password
            ",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.password)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(e, EMAIL_TAKEN))?
        .ok_or(RepositoryError::NotFound("user"))
    }

    async fn delete_user(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, EMAIL_TAKEN))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("user"));
        }
        Ok(())
    }

    // =========================================================================
    // Stores
    // =========================================================================

    async fn find_store_by_owner(
        &self,
        user_id: UserId,
    ) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT id, name, user_id FROM stores WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(store)
    }

    async fn create_store(&self, new: NewStore) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>(
            r"
            INSERT INTO stores (name, user_id)
            VALUES ($1, $2)
            RETURNING id, name, user_id
            ",
        )
        .bind(&new.name)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, STORE_TAKEN))
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<StoreDetail>, RepositoryError> {
        let sql = format!("{STORE_OWNER_SELECT} WHERE s.id = $1");
        let Some(row) = sqlx::query_as::<_, StoreOwnerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, store_id
            FROM products
            WHERE store_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let StoreWithOwner { store, user } = row.into();
        Ok(Some(StoreDetail {
            store,
            user,
            products,
        }))
    }

    async fn update_store(
        &self,
        id: StoreId,
        patch: StorePatch,
    ) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>(
            r"
            UPDATE stores
            SET name = COALESCE($2, name),
                user_id = COALESCE($3, user_id)
            WHERE id = $1
            RETURNING id, name, user_id
            ",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(e, STORE_TAKEN))?
        .ok_or(RepositoryError::NotFound("store"))
    }

    async fn delete_store(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, STORE_TAKEN))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("store"));
        }
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    async fn create_product(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (name, price, store_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, store_id
            ",
        )
        .bind(&new.name)
        .bind(new.price)
        .bind(new.store_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "product already exists"))
    }

    async fn list_products(&self) -> Result<Vec<ProductDetail>, RepositoryError> {
        let sql = format!("{PRODUCT_DETAIL_SELECT} ORDER BY p.id ASC");
        let rows = sqlx::query_as::<_, ProductDetailRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let sql = format!("{PRODUCT_DETAIL_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductDetailRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                store_id = COALESCE($4, store_id)
            WHERE id = $1
            RETURNING id, name, price, store_id
            ",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.price)
        .bind(patch.store_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(e, "product already exists"))?
        .ok_or(RepositoryError::NotFound("product"))
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("product"));
        }
        Ok(())
    }
}
