//! Gateway request/response types.
//!
//! Shape validation lives here at the serde layer (`Amount` rejects
//! negatives and malformed decimals); domain validation happens in the
//! engine.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::account::Account;
use crate::money::Amount;
use crate::user::User;

/// Body of POST /api/v1/transactions
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub source_account_id: i64,
    pub destination_account_id: i64,
    /// Positive decimal, string or number; strings preserve precision.
    #[schema(value_type = String, example = "30.00")]
    pub amount: Amount,
    /// Client idempotency key; replays return the original transaction.
    #[serde(default)]
    pub cid: Option<String>,
}

/// Body of PUT /api/v1/transactions/{id}
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTransactionRequest {
    #[schema(value_type = String, example = "40.00")]
    pub amount: Amount,
}

/// Query of GET /api/v1/transactions
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionListQuery {
    /// Match transactions touching this account on either side
    pub account_id: Option<i64>,
    /// PENDING | COMPLETED | FAILED | REVERSED
    pub status: Option<String>,
}

/// Body of DELETE /api/v1/users/{id}
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDeletedResponse {
    pub message: String,
    pub user: User,
}

/// Body of DELETE /api/v1/accounts/{id}
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountDeletedResponse {
    pub message: String,
    pub account: Account,
}
