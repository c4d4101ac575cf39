//! Bankledger service entry point.
//!
//! Wiring order: config → logging → stores (PostgreSQL when configured,
//! in-memory otherwise) → transfer engine → HTTP gateway. Everything is
//! constructed here and passed down; nothing is process-global.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use bankledger::account::{AccountStore, MemAccountStore, PgAccountStore};
use bankledger::config::AppConfig;
use bankledger::db::Database;
use bankledger::gateway::{self, AppState};
use bankledger::ledger::{MemTransactionLog, PgTransactionLog, TransactionLog};
use bankledger::logging::init_logging;
use bankledger::transfer::TransferEngine;
use bankledger::user::{MemUserStore, PgUserStore, UserStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load_or_default(&env);
    let _log_guard = init_logging(&config);

    tracing::info!(env = %env, "Starting bankledger");

    let lock_timeout = Duration::from_millis(config.engine.lock_timeout_ms);

    let (users, accounts, log): (
        Arc<dyn UserStore>,
        Arc<dyn AccountStore>,
        Arc<dyn TransactionLog>,
    ) = match config.postgres_url {
        Some(ref url) => {
            let db = Database::connect(url)
                .await
                .context("failed to connect to PostgreSQL")?;
            db.init_schema()
                .await
                .context("failed to initialize schema")?;
            db.health_check()
                .await
                .context("PostgreSQL health check failed")?;
            println!("🗄️  Store backend: PostgreSQL");

            let pool = db.pool().clone();
            (
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgAccountStore::new(pool.clone())),
                Arc::new(PgTransactionLog::new(pool)),
            )
        }
        None => {
            println!("🗄️  Store backend: in-memory (set postgres_url for persistence)");
            (
                Arc::new(MemUserStore::new()),
                Arc::new(MemAccountStore::new()),
                Arc::new(MemTransactionLog::new()),
            )
        }
    };

    let engine = Arc::new(TransferEngine::new(
        accounts.clone(),
        log.clone(),
        lock_timeout,
    ));

    let state = AppState::new(users, accounts, log, engine);

    let port = get_port_override().unwrap_or(config.gateway.port);
    gateway::run_server(&config.gateway.host, port, state).await;

    tracing::info!("bankledger stopped");
    Ok(())
}
