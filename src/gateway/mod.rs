//! HTTP gateway
//!
//! Thin layer over the stores and the transfer engine: routes, shape
//! validation, error-to-status mapping, OpenAPI docs.

pub mod error;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

/// Build the full application router.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health::health_check))
        // Users
        .route("/users", post(handlers::users::create_user))
        .route("/users", get(handlers::users::list_users))
        .route("/users/{user_id}", get(handlers::users::get_user))
        .route("/users/{user_id}", put(handlers::users::update_user))
        .route("/users/{user_id}", delete(handlers::users::delete_user))
        // Accounts
        .route("/accounts", post(handlers::accounts::create_account))
        .route("/accounts", get(handlers::accounts::list_accounts))
        .route("/accounts/{account_id}", get(handlers::accounts::get_account))
        .route("/accounts/{account_id}", put(handlers::accounts::update_account))
        .route(
            "/accounts/{account_id}",
            delete(handlers::accounts::delete_account),
        )
        // Transactions
        .route(
            "/transactions",
            post(handlers::transactions::create_transaction),
        )
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions),
        )
        .route(
            "/transactions/{transaction_id}",
            get(handlers::transactions::get_transaction),
        )
        .route(
            "/transactions/{transaction_id}",
            put(handlers::transactions::update_transaction),
        )
        .route(
            "/transactions/{transaction_id}",
            delete(handlers::transactions::delete_transaction),
        );

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway server.
pub async fn run_server(host: &str, port: u16, state: AppState) {
    let app = app_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                port, port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Gateway listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);
    println!("📂 API root: /api/v1");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
