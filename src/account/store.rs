//! Storage contract for accounts.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::models::{Account, AccountUpdate, NewAccount};
use crate::error::LedgerError;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, account_id: i64) -> Result<Account, LedgerError>;

    async fn list(&self) -> Result<Vec<Account>, LedgerError>;

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Account>, LedgerError>;

    async fn create(&self, new: NewAccount) -> Result<Account, LedgerError>;

    async fn update(&self, account_id: i64, update: AccountUpdate)
    -> Result<Account, LedgerError>;

    /// Conflict unless the balance is exactly zero. The Pending-transaction
    /// check lives in the engine, which owns the account locks.
    async fn delete(&self, account_id: i64) -> Result<Account, LedgerError>;

    /// Atomically apply `balance += delta`.
    ///
    /// InsufficientFunds (and no mutation) when the result would be
    /// negative. The read-modify-write is serialized per account; callers
    /// touching disjoint accounts do not contend.
    async fn adjust_balance(&self, account_id: i64, delta: Decimal)
    -> Result<Account, LedgerError>;
}
