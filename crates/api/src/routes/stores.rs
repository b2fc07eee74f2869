//! Store route handlers.
//!
//! Every failure other than a missing store on read is reported as a 400.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use storekeep_core::{LooseId, StoreId, UserId, truthy_text};

use super::extract::{Id, JsonBody, required};
use crate::db::RepositoryError;
use crate::error::{ApiError, Result};
use crate::models::{NewStore, Store, StoreDetail, StorePatch};
use crate::state::AppState;

const STORE_TAKEN: &str = "user already has a store";

/// Request to create a store.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: Option<String>,
    pub user_id: Option<LooseId>,
}

/// Request to update a store. Empty names and zero ids count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub user_id: Option<LooseId>,
}

impl TryFrom<UpdateStoreRequest> for StorePatch {
    type Error = RepositoryError;

    fn try_from(req: UpdateStoreRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: truthy_text(req.name),
            user_id: LooseId::truthy(req.user_id)
                .map(|id| id.resolve::<UserId>())
                .transpose()?,
        })
    }
}

/// Create a store for a user.
///
/// POST /stores
///
/// A user that already owns a store is turned away before the insert. A
/// concurrent insert that slips past that lookup hits the unique owner
/// constraint and gets the same answer.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateStoreRequest>,
) -> Result<(StatusCode, Json<Store>)> {
    let user_id: UserId = required(body.user_id, "userId")
        .and_then(|id| id.resolve().map_err(RepositoryError::from))
        .map_err(ApiError::bad_request)?;

    let existing = state
        .repo()
        .find_store_by_owner(user_id)
        .await
        .map_err(ApiError::bad_request)?;
    if existing.is_some() {
        return Err(ApiError::BadRequest(STORE_TAKEN.to_string()));
    }

    let name = required(body.name, "name").map_err(ApiError::bad_request)?;
    let store = state
        .repo()
        .create_store(NewStore { name, user_id })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => ApiError::BadRequest(STORE_TAKEN.to_string()),
            other => ApiError::bad_request(other),
        })?;

    tracing::info!(store_id = %store.id, user_id = %user_id, "Store created");
    Ok((StatusCode::CREATED, Json(store)))
}

/// Get a store with its owner and products.
///
/// GET /stores/:id
pub async fn show(
    State(state): State<AppState>,
    Id(id): Id<StoreId>,
) -> Result<Json<StoreDetail>> {
    state
        .repo()
        .get_store(id)
        .await
        .map_err(ApiError::bad_request)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("store not found".to_string()))
}

/// Update a store's name or owner.
///
/// PUT /stores/:id
pub async fn update(
    State(state): State<AppState>,
    Id(id): Id<StoreId>,
    JsonBody(body): JsonBody<UpdateStoreRequest>,
) -> Result<Json<Store>> {
    let patch = StorePatch::try_from(body).map_err(ApiError::bad_request)?;
    let store = state
        .repo()
        .update_store(id, patch)
        .await
        .map_err(ApiError::bad_request)?;

    Ok(Json(store))
}

/// Delete a store.
///
/// DELETE /stores/:id
pub async fn destroy(State(state): State<AppState>, Id(id): Id<StoreId>) -> Result<StatusCode> {
    state
        .repo()
        .delete_store(id)
        .await
        .map_err(ApiError::bad_request)?;

    tracing::info!(store_id = %id, "Store deleted");
    Ok(StatusCode::NO_CONTENT)
}
