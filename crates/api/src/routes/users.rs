//! User route handlers.
//!
//! The collection is mounted at `/usuarios`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use storekeep_core::{UserId, truthy_text};

use super::extract::{Id, JsonBody, required};
use crate::db::RepositoryError;
use crate::error::{ApiError, Result};
use crate::models::{NewUser, User, UserPatch};
use crate::state::AppState;

const USER_NOT_FOUND: &str = "user not found";
const CREATE_FAILED: &str = "failed to create user";

/// Request to create a user.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CreateUserRequest {
    fn into_new(self) -> std::result::Result<NewUser, RepositoryError> {
        Ok(NewUser {
            name: required(self.name, "name")?,
            email: required(self.email, "email")?,
            password: required(self.password, "password")?,
        })
    }
}

/// Request to update a user. Empty strings count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: truthy_text(req.name),
            email: truthy_text(req.email),
            password: truthy_text(req.password),
        }
    }
}

/// Create a user.
///
/// POST /usuarios
///
/// A taken email is a 409. Any other failure, including a well-formed JSON
/// body of the wrong shape, is a 500. Only a body that is not JSON at all
/// is a 400.
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let Json(body) = body.map_err(|rejection| match rejection {
        JsonRejection::JsonDataError(e) => ApiError::internal(e, CREATE_FAILED),
        other => ApiError::from(other),
    })?;

    let created = match body.into_new() {
        Ok(new) => state.repo().create_user(new).await,
        Err(e) => Err(e),
    };

    let user = created.map_err(|e| match e {
        RepositoryError::Conflict(_) => ApiError::Conflict("email already registered".to_string()),
        other => ApiError::internal(other, CREATE_FAILED),
    })?;

    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users by ascending id.
///
/// GET /usuarios
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = state
        .repo()
        .list_users()
        .await
        .map_err(|e| ApiError::internal(e, "failed to list users"))?;

    Ok(Json(users))
}

/// Get a user.
///
/// GET /usuarios/:id
pub async fn show(State(state): State<AppState>, Id(id): Id<UserId>) -> Result<Json<User>> {
    state
        .repo()
        .get_user(id)
        .await
        .map_err(ApiError::bad_request)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))
}

/// Update a user's name, email or password.
///
/// PUT /usuarios/:id
pub async fn update(
    State(state): State<AppState>,
    Id(id): Id<UserId>,
    JsonBody(body): JsonBody<UpdateUserRequest>,
) -> Result<Json<User>> {
    let user = state
        .repo()
        .update_user(id, body.into())
        .await
        .map_err(not_found_or_bad_request)?;

    Ok(Json(user))
}

/// Delete a user.
///
/// DELETE /usuarios/:id
pub async fn destroy(State(state): State<AppState>, Id(id): Id<UserId>) -> Result<StatusCode> {
    state
        .repo()
        .delete_user(id)
        .await
        .map_err(not_found_or_bad_request)?;

    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found_or_bad_request(err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::NotFound(_) => ApiError::NotFound(USER_NOT_FOUND.to_string()),
        other => ApiError::bad_request(other),
    }
}
