//! Account CRUD handlers.
//!
//! No balance-editing endpoint exists: balances move only through the
//! transfer engine.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::super::types::AccountDeletedResponse;
use crate::account::{Account, AccountStore, AccountUpdate, NewAccount};
use crate::user::UserStore;

/// Open an account for a user
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = NewAccount,
    responses(
        (status = 201, description = "Account created", body = Account),
        (status = 404, description = "Owner not found")
    ),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<NewAccount>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    // Owner must exist; the memory store has no FK to catch it.
    state.users.get(req.user_id).await?;

    let account = state.accounts.create(req).await?;
    tracing::info!(
        account_id = account.account_id,
        user_id = account.user_id,
        "account created"
    );
    Ok((StatusCode::CREATED, Json(account)))
}

/// List accounts
///
/// GET /api/v1/accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "All accounts", body = [Account])
    ),
    tag = "Accounts"
)]
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Account>>, ApiError> {
    Ok(Json(state.accounts.list().await?))
}

/// Get one account
///
/// GET /api/v1/accounts/{account_id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    params(("account_id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account detail", body = Account),
        (status = 404, description = "Account not found")
    ),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(state.accounts.get(account_id).await?))
}

/// Update an account's bank details
///
/// PUT /api/v1/accounts/{account_id}
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{account_id}",
    params(("account_id" = i64, Path, description = "Account id")),
    request_body = AccountUpdate,
    responses(
        (status = 200, description = "Updated account", body = Account),
        (status = 404, description = "Account not found")
    ),
    tag = "Accounts"
)]
pub async fn update_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
    Json(req): Json<AccountUpdate>,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(state.accounts.update(account_id, req).await?))
}

/// Close an account
///
/// DELETE /api/v1/accounts/{account_id}
///
/// Legal only when the balance is zero and no transaction touching the
/// account is Pending; goes through the engine so no transfer can
/// interleave with the closure.
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{account_id}",
    params(("account_id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deleted", body = AccountDeletedResponse),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Non-zero balance or pending transactions")
    ),
    tag = "Accounts"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountDeletedResponse>, ApiError> {
    let account = state.engine.close_account(account_id).await?;
    tracing::info!(account_id, "account closed");
    Ok(Json(AccountDeletedResponse {
        message: "Account deleted".to_string(),
        account,
    }))
}
