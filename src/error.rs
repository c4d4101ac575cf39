//! Domain error taxonomy.
//!
//! One enum shared by the stores, the engine, and the gateway. Store and
//! log errors propagate unchanged to the engine; the engine may apply a
//! compensating action before re-propagating, but it never swallows or
//! rewrites an error.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(i64),

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Source and destination accounts are the same")]
    SelfTransfer,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Completed transactions are immutable")]
    ImmutableRecord,

    #[error("Illegal status transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Operation timed out waiting for account locks")]
    Timeout,

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl LedgerError {
    /// Stable numeric code for API clients.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidAmount => 1001,
            Self::SelfTransfer => 1002,
            Self::InsufficientFunds => 1003,
            Self::Conflict(_) => 1004,
            Self::ImmutableRecord => 1005,
            Self::InvalidStateTransition { .. } => 1006,
            Self::UserNotFound(_) => 4001,
            Self::AccountNotFound(_) => 4002,
            Self::TransactionNotFound(_) => 4003,
            Self::Timeout => 4080,
            Self::Storage(_) => 5000,
        }
    }

    /// Error name string for API clients.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::SelfTransfer => "SELF_TRANSFER",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::Conflict(_) => "CONFLICT",
            Self::ImmutableRecord => "IMMUTABLE_RECORD",
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// HTTP status this error maps to at the API layer.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidAmount | Self::SelfTransfer => StatusCode::BAD_REQUEST,
            Self::InsufficientFunds
            | Self::Conflict(_)
            | Self::ImmutableRecord
            | Self::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            Self::UserNotFound(_) | Self::AccountNotFound(_) | Self::TransactionNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
