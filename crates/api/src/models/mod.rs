//! Domain models for the API.
//!
//! Entity structs double as `sqlx` row types and as JSON response bodies.
//! JSON field names are camelCase (`userId`, `storeId`).
//!
//! Relationships: a [`User`] owns at most one [`Store`], and a store has any
//! number of [`Product`]s. The `*Detail` types carry related records
//! expanded inline.

pub mod product;
pub mod store;
pub mod user;

pub use product::{NewProduct, Product, ProductDetail, ProductPatch};
pub use store::{NewStore, Store, StoreDetail, StorePatch, StoreWithOwner};
pub use user::{NewUser, User, UserPatch};
