//! In-memory account store.
//!
//! A DashMap entry guard serializes the read-modify-write of one
//! account's balance; operations on disjoint accounts run in parallel.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;

use super::models::{Account, AccountUpdate, NewAccount};
use super::store::AccountStore;
use crate::error::LedgerError;

pub struct MemAccountStore {
    accounts: DashMap<i64, Account>,
    next_id: AtomicI64,
}

impl Default for MemAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl AccountStore for MemAccountStore {
    async fn get(&self, account_id: i64) -> Result<Account, LedgerError> {
        self.accounts
            .get(&account_id)
            .map(|a| a.clone())
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn list(&self) -> Result<Vec<Account>, LedgerError> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|a| a.clone()).collect();
        accounts.sort_by_key(|a| a.account_id);
        Ok(accounts)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Account>, LedgerError> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.clone())
            .collect();
        accounts.sort_by_key(|a| a.account_id);
        Ok(accounts)
    }

    async fn create(&self, new: NewAccount) -> Result<Account, LedgerError> {
        let account_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let account = Account {
            account_id,
            user_id: new.user_id,
            bank_name: new.bank_name.clone(),
            bank_account_number: new.bank_account_number.clone(),
            balance: new.initial_balance(),
            created_at: Utc::now(),
        };
        self.accounts.insert(account_id, account.clone());
        Ok(account)
    }

    async fn update(
        &self,
        account_id: i64,
        update: AccountUpdate,
    ) -> Result<Account, LedgerError> {
        let mut entry = self
            .accounts
            .get_mut(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        if let Some(bank_name) = update.bank_name {
            entry.bank_name = bank_name;
        }
        if let Some(number) = update.bank_account_number {
            entry.bank_account_number = number;
        }
        Ok(entry.clone())
    }

    async fn delete(&self, account_id: i64) -> Result<Account, LedgerError> {
        // Check-and-remove under the entry guard so a concurrent credit
        // cannot land between the balance check and the removal.
        match self.accounts.entry(account_id) {
            Entry::Occupied(entry) => {
                if !entry.get().balance.is_zero() {
                    return Err(LedgerError::Conflict(format!(
                        "account {} has a non-zero balance",
                        account_id
                    )));
                }
                Ok(entry.remove())
            }
            Entry::Vacant(_) => Err(LedgerError::AccountNotFound(account_id)),
        }
    }

    async fn adjust_balance(
        &self,
        account_id: i64,
        delta: Decimal,
    ) -> Result<Account, LedgerError> {
        let mut entry = self
            .accounts
            .get_mut(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let new_balance = entry.balance + delta;
        if new_balance < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds);
        }
        entry.balance = new_balance;
        Ok(entry.clone())
    }
}
