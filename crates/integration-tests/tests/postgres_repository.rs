//! Repository tests against a real `PostgreSQL` database.
//!
//! These tests are ignored by default. Point `DATABASE_URL` at a disposable
//! database and run with `--ignored`. Migrations are applied on connect and
//! every test uses unique emails so runs can share a database.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use storekeep_api::db::{self, PgRepository, Repository, RepositoryError};
use storekeep_api::models::{NewProduct, NewStore, NewUser, ProductPatch, User, UserPatch};
use storekeep_core::Price;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("../api/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

async fn new_user(repo: &PgRepository) -> User {
    repo.create_user(NewUser {
        name: "Ana".to_owned(),
        email: format!("{}@example.com", Uuid::new_v4()),
        password: "pw".to_owned(),
    })
    .await
    .expect("Failed to create user")
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_duplicate_email_is_conflict() {
    let repo = PgRepository::new(pool().await);
    let user = new_user(&repo).await;

    let err = repo
        .create_user(NewUser {
            name: "Other".to_owned(),
            email: user.email.clone(),
            password: "pw".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_partial_update_keeps_unset_columns() {
    let repo = PgRepository::new(pool().await);
    let user = new_user(&repo).await;

    let updated = repo
        .update_user(
            user.id,
            UserPatch {
                name: Some("Bea".to_owned()),
                ..UserPatch::default()
            },
        )
        .await
        .expect("Failed to update user");
    assert_eq!(updated.name, "Bea");
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.password, user.password);
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_concurrent_store_creation_is_single() {
    let pool = pool().await;
    let repo = PgRepository::new(pool.clone());
    let user = new_user(&repo).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = PgRepository::new(pool.clone());
            tokio::spawn(async move {
                repo.create_store(NewStore {
                    name: format!("Store {i}"),
                    user_id: user.id,
                })
                .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(store) => {
                assert_eq!(store.user_id, user.id);
                created += 1;
            }
            Err(err) => assert!(matches!(err, RepositoryError::Conflict(_)), "got {err:?}"),
        }
    }
    assert_eq!(created, 1);

    let store = repo
        .find_store_by_owner(user.id)
        .await
        .expect("Failed to look up store");
    assert!(store.is_some());
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_price_is_stored_exactly() {
    let repo = PgRepository::new(pool().await);
    let user = new_user(&repo).await;
    let store = repo
        .create_store(NewStore {
            name: "Corner".to_owned(),
            user_id: user.id,
        })
        .await
        .expect("Failed to create store");

    let product = repo
        .create_product(NewProduct {
            name: "Mug".to_owned(),
            price: Price::parse("19.99").expect("valid price"),
            store_id: store.id,
        })
        .await
        .expect("Failed to create product");
    assert_eq!(product.price.to_string(), "19.99");

    let updated = repo
        .update_product(
            product.id,
            ProductPatch {
                price: Some(Price::parse("0.10").expect("valid price")),
                ..ProductPatch::default()
            },
        )
        .await
        .expect("Failed to update product");
    assert_eq!(updated.price.to_string(), "0.10");
    assert_eq!(updated.name, "Mug");

    let detail = repo
        .get_product(product.id)
        .await
        .expect("Failed to get product")
        .expect("product exists");
    assert_eq!(detail.store.store.id, store.id);
    assert_eq!(detail.store.user, user);
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_deletes_are_restricted_by_references() {
    let repo = PgRepository::new(pool().await);
    let user = new_user(&repo).await;
    let store = repo
        .create_store(NewStore {
            name: "Corner".to_owned(),
            user_id: user.id,
        })
        .await
        .expect("Failed to create store");
    let product = repo
        .create_product(NewProduct {
            name: "Mug".to_owned(),
            price: Price::parse("1").expect("valid price"),
            store_id: store.id,
        })
        .await
        .expect("Failed to create product");

    let err = repo.delete_user(user.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Invalid(_)), "got {err:?}");
    let err = repo.delete_store(store.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Invalid(_)), "got {err:?}");

    repo.delete_product(product.id)
        .await
        .expect("Failed to delete product");
    repo.delete_store(store.id)
        .await
        .expect("Failed to delete store");
    repo.delete_user(user.id)
        .await
        .expect("Failed to delete user");

    let err = repo.delete_user(user.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)), "got {err:?}");
}
