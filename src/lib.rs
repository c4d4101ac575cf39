//! Bankledger - Bank Account & Transfer Ledger Service
//!
//! A REST backend for users, bank accounts, and money transfers. The core
//! is the transfer engine: it mutates two account balances as a
//! consequence of recording one transaction, atomically, under concurrent
//! load.
//!
//! # Modules
//!
//! - [`money`] - Strict decimal amounts (the only money representation)
//! - [`error`] - Domain error taxonomy
//! - [`user`] - User CRUD store
//! - [`account`] - Account store with the atomic balance-adjust primitive
//! - [`ledger`] - Append-only transaction log with CAS status transitions
//! - [`transfer`] - The transfer engine (atomic unit, locks, compensation)
//! - [`gateway`] - HTTP API (axum)
//! - [`config`] / [`logging`] / [`db`] - service plumbing

pub mod account;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod transfer;
pub mod user;

// Convenient re-exports at crate root
pub use account::{Account, AccountStore, MemAccountStore, PgAccountStore};
pub use error::LedgerError;
pub use ledger::{
    MemTransactionLog, PgTransactionLog, Transaction, TransactionLog, TransactionStatus,
};
pub use money::Amount;
pub use transfer::TransferEngine;
pub use user::{MemUserStore, PgUserStore, User, UserStore};
