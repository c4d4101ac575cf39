//! User CRUD handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::super::types::UserDeletedResponse;
use crate::account::AccountStore;
use crate::user::{NewUser, User, UserStore, UserUpdate};

/// Create a user
///
/// POST /api/v1/users
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Email already registered")
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.users.create(req).await?;
    tracing::info!(user_id = user.user_id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users
///
/// GET /api/v1/users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users", body = [User])
    ),
    tag = "Users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

/// Get one user
///
/// GET /api/v1/users/{user_id}
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User detail", body = User),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get(user_id).await?))
}

/// Update a user
///
/// PUT /api/v1/users/{user_id}
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.update(user_id, req).await?))
}

/// Delete a user
///
/// DELETE /api/v1/users/{user_id}
///
/// Conflict while the user still owns accounts.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = UserDeletedResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still owns accounts")
    ),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDeletedResponse>, ApiError> {
    let owned = state.accounts.list_by_user(user_id).await?;
    if !owned.is_empty() {
        return Err(crate::error::LedgerError::Conflict(format!(
            "user {} still owns {} account(s)",
            user_id,
            owned.len()
        ))
        .into());
    }

    let user = state.users.delete(user_id).await?;
    tracing::info!(user_id, "user deleted");
    Ok(Json(UserDeletedResponse {
        message: "User deleted".to_string(),
        user,
    }))
}
