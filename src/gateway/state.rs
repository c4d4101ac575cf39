//! Shared gateway application state.

use std::sync::Arc;

use crate::account::AccountStore;
use crate::ledger::TransactionLog;
use crate::transfer::TransferEngine;
use crate::user::UserStore;

/// Handles built once at startup and passed down to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub log: Arc<dyn TransactionLog>,
    pub engine: Arc<TransferEngine>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        accounts: Arc<dyn AccountStore>,
        log: Arc<dyn TransactionLog>,
        engine: Arc<TransferEngine>,
    ) -> Self {
        Self {
            users,
            accounts,
            log,
            engine,
        }
    }
}
