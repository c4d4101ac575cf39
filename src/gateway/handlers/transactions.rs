//! Transaction handlers, backed by the transfer engine.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::super::types::{TransactionListQuery, TransferRequest, UpdateTransactionRequest};
use crate::ledger::{Transaction, TransactionFilter, TransactionLog, TransactionStatus};

/// Execute a transfer
///
/// POST /api/v1/transactions
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = TransferRequest,
    responses(
        (status = 201, description = "Transfer completed", body = Transaction),
        (status = 400, description = "Invalid amount or self transfer"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Insufficient funds"),
        (status = 408, description = "Timed out waiting for account locks")
    ),
    tag = "Transactions"
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let tx = state
        .engine
        .transfer(
            req.source_account_id,
            req.destination_account_id,
            req.amount,
            req.cid,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// List transactions
///
/// GET /api/v1/transactions
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "Matching transactions", body = [Transaction]),
        (status = 400, description = "Unknown status filter")
    ),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let status = match query.status.as_deref() {
        Some(s) => Some(
            TransactionStatus::from_str(s)
                .map_err(|_| ApiError::bad_request(format!("unknown status: {}", s)))?,
        ),
        None => None,
    };

    let txs = state
        .log
        .list(TransactionFilter {
            account_id: query.account_id,
            status,
        })
        .await?;
    Ok(Json(txs))
}

/// Get one transaction
///
/// GET /api/v1/transactions/{transaction_id}
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    params(("transaction_id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction detail", body = Transaction),
        (status = 404, description = "Transaction not found")
    ),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> Result<Json<Transaction>, ApiError> {
    Ok(Json(state.log.get(transaction_id).await?))
}

/// Amend a pending transaction's amount
///
/// PUT /api/v1/transactions/{transaction_id}
///
/// Completed transfers are immutable history.
#[utoipa::path(
    put,
    path = "/api/v1/transactions/{transaction_id}",
    params(("transaction_id" = i64, Path, description = "Transaction id")),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Updated transaction", body = Transaction),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Record is immutable")
    ),
    tag = "Transactions"
)]
pub async fn update_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
    Json(req): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let tx = state.engine.update_amount(transaction_id, req.amount).await?;
    Ok(Json(tx))
}

/// Reverse a completed transaction
///
/// DELETE /api/v1/transactions/{transaction_id}
///
/// Completed records are never physically deleted; this applies the
/// inverse balance adjustments and appends the Reversed status.
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{transaction_id}",
    params(("transaction_id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Reversed transaction", body = Transaction),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Not completed, or destination cannot cover the reversal")
    ),
    tag = "Transactions"
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> Result<Json<Transaction>, ApiError> {
    let tx = state.engine.reverse(transaction_id).await?;
    Ok(Json(tx))
}
