//! Storage contract for the transaction log.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::transaction::{NewTransaction, Transaction, TransactionFilter, TransactionStatus};
use crate::error::LedgerError;

#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Append a new record in Pending status. Ids are monotonically
    /// increasing. Idempotent on `cid`: appending with a cid that already
    /// exists returns the existing record untouched.
    async fn append(&self, new: NewTransaction) -> Result<Transaction, LedgerError>;

    async fn get(&self, transaction_id: i64) -> Result<Transaction, LedgerError>;

    async fn get_by_cid(&self, cid: &str) -> Result<Option<Transaction>, LedgerError>;

    /// Finite listing ordered by id; each call re-runs the scan.
    async fn list(&self, filter: TransactionFilter) -> Result<Vec<Transaction>, LedgerError>;

    /// CAS status transition. Fails with InvalidStateTransition when the
    /// stored status is not `from`, or when `from -> to` is not a legal
    /// edge. The record is otherwise immutable.
    async fn transition(
        &self,
        transaction_id: i64,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<Transaction, LedgerError>;

    /// CAS amount update, legal only while Pending; ImmutableRecord
    /// otherwise.
    async fn update_amount(
        &self,
        transaction_id: i64,
        new_amount: Decimal,
    ) -> Result<Transaction, LedgerError>;

    /// True when any Pending record references the account on either side.
    async fn has_active(&self, account_id: i64) -> Result<bool, LedgerError>;
}
