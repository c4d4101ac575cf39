//! OpenAPI / Swagger UI documentation
//!
//! - Swagger UI: `http://localhost:3000/docs`
//! - OpenAPI JSON: `http://localhost:3000/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::account::{Account, AccountUpdate, NewAccount};
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    AccountDeletedResponse, TransferRequest, UpdateTransactionRequest, UserDeletedResponse,
};
use crate::ledger::Transaction;
use crate::user::{NewUser, User, UserUpdate};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bankledger API",
        version = "0.1.0",
        description = "Bank account and transfer ledger service. Transfers execute atomically: \
            both balance mutations and the log entry are visible together or not at all.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::users::create_user,
        crate::gateway::handlers::users::list_users,
        crate::gateway::handlers::users::get_user,
        crate::gateway::handlers::users::update_user,
        crate::gateway::handlers::users::delete_user,
        crate::gateway::handlers::accounts::create_account,
        crate::gateway::handlers::accounts::list_accounts,
        crate::gateway::handlers::accounts::get_account,
        crate::gateway::handlers::accounts::update_account,
        crate::gateway::handlers::accounts::delete_account,
        crate::gateway::handlers::transactions::create_transaction,
        crate::gateway::handlers::transactions::list_transactions,
        crate::gateway::handlers::transactions::get_transaction,
        crate::gateway::handlers::transactions::update_transaction,
        crate::gateway::handlers::transactions::delete_transaction,
    ),
    components(
        schemas(
            HealthResponse,
            User,
            NewUser,
            UserUpdate,
            UserDeletedResponse,
            Account,
            NewAccount,
            AccountUpdate,
            AccountDeletedResponse,
            Transaction,
            TransferRequest,
            UpdateTransactionRequest,
        )
    ),
    tags(
        (name = "Users", description = "User management"),
        (name = "Accounts", description = "Bank account management"),
        (name = "Transactions", description = "Money transfers and the transaction log"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Bankledger API");
    }

    #[test]
    fn test_all_resources_registered() {
        let spec = ApiDoc::openapi();
        let paths = &spec.paths.paths;
        assert!(paths.contains_key("/api/v1/health"));
        assert!(paths.contains_key("/api/v1/users"));
        assert!(paths.contains_key("/api/v1/accounts/{account_id}"));
        assert!(paths.contains_key("/api/v1/transactions/{transaction_id}"));
    }

    #[test]
    fn test_openapi_json_serializable() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json();
        assert!(json.is_ok());
        assert!(json.unwrap().contains("Bankledger API"));
    }
}
