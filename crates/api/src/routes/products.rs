//! Product route handlers.
//!
//! Every failure other than a missing product on read is reported as a 400.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use storekeep_core::{LooseId, LoosePrice, ProductId, StoreId, truthy_text};

use super::extract::{Id, JsonBody, required};
use crate::db::RepositoryError;
use crate::error::{ApiError, Result};
use crate::models::{NewProduct, Product, ProductDetail, ProductPatch};
use crate::state::AppState;

/// Request to create a product.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub price: Option<LoosePrice>,
    pub store_id: Option<LooseId>,
}

impl TryFrom<CreateProductRequest> for NewProduct {
    type Error = RepositoryError;

    fn try_from(req: CreateProductRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: required(req.name, "name")?,
            price: required(req.price, "price")?.resolve()?,
            store_id: required(req.store_id, "storeId")?.resolve()?,
        })
    }
}

/// Request to update a product.
///
/// Empty names and zero store ids count as absent; any price that is sent,
/// including zero, is applied.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<LoosePrice>,
    pub store_id: Option<LooseId>,
}

impl TryFrom<UpdateProductRequest> for ProductPatch {
    type Error = RepositoryError;

    fn try_from(req: UpdateProductRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: truthy_text(req.name),
            price: req.price.map(|p| p.resolve()).transpose()?,
            store_id: LooseId::truthy(req.store_id)
                .map(|id| id.resolve::<StoreId>())
                .transpose()?,
        })
    }
}

/// Create a product in a store.
///
/// POST /products
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let new = NewProduct::try_from(body).map_err(ApiError::bad_request)?;
    let product = state
        .repo()
        .create_product(new)
        .await
        .map_err(ApiError::bad_request)?;

    tracing::info!(product_id = %product.id, store_id = %product.store_id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// List all products with their store and the store's owner.
///
/// GET /products
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductDetail>>> {
    let products = state
        .repo()
        .list_products()
        .await
        .map_err(ApiError::bad_request)?;

    Ok(Json(products))
}

/// Get a product with its store and the store's owner.
///
/// GET /products/:id
pub async fn show(
    State(state): State<AppState>,
    Id(id): Id<ProductId>,
) -> Result<Json<ProductDetail>> {
    state
        .repo()
        .get_product(id)
        .await
        .map_err(ApiError::bad_request)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("product not found".to_string()))
}

/// Update a product's name, price or store.
///
/// PUT /products/:id
pub async fn update(
    State(state): State<AppState>,
    Id(id): Id<ProductId>,
    JsonBody(body): JsonBody<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let patch = ProductPatch::try_from(body).map_err(ApiError::bad_request)?;
    let product = state
        .repo()
        .update_product(id, patch)
        .await
        .map_err(ApiError::bad_request)?;

    Ok(Json(product))
}

/// Delete a product.
///
/// DELETE /products/:id
pub async fn destroy(
    State(state): State<AppState>,
    Id(id): Id<ProductId>,
) -> Result<StatusCode> {
    state
        .repo()
        .delete_product(id)
        .await
        .map_err(ApiError::bad_request)?;

    Ok(StatusCode::NO_CONTENT)
}
