//! Transaction log module
//!
//! Append-only record of transfer attempts and outcomes. The log is the
//! source of truth for whether a transfer happened: records are never
//! physically deleted once Completed, they are transitioned to Reversed.

pub mod mem;
pub mod pg;
pub mod store;
pub mod transaction;

pub use mem::MemTransactionLog;
pub use pg::PgTransactionLog;
pub use store::TransactionLog;
pub use transaction::{NewTransaction, Transaction, TransactionFilter, TransactionStatus};
