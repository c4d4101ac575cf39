//! PostgreSQL account store.
//!
//! `adjust_balance` is a single conditional UPDATE; the WHERE clause
//! carries the non-negativity check so the database serializes the
//! read-modify-write per row.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use super::models::{Account, AccountUpdate, NewAccount};
use super::store::AccountStore;
use crate::error::LedgerError;

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &sqlx::postgres::PgRow) -> Account {
        Account {
            account_id: row.get("account_id"),
            user_id: row.get("user_id"),
            bank_name: row.get("bank_name"),
            bank_account_number: row.get("bank_account_number"),
            balance: row.get("balance"),
            created_at: row.get("created_at"),
        }
    }

    const COLUMNS: &'static str =
        "account_id, user_id, bank_name, bank_account_number, balance, created_at";
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn get(&self, account_id: i64) -> Result<Account, LedgerError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts_tb WHERE account_id = $1",
            Self::COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::row_to_account(&r))
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn list(&self) -> Result<Vec<Account>, LedgerError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts_tb ORDER BY account_id",
            Self::COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_account).collect())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Account>, LedgerError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts_tb WHERE user_id = $1 ORDER BY account_id",
            Self::COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_account).collect())
    }

    async fn create(&self, new: NewAccount) -> Result<Account, LedgerError> {
        let row = sqlx::query(&format!(
            "INSERT INTO accounts_tb (user_id, bank_name, bank_account_number, balance)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            Self::COLUMNS
        ))
        .bind(new.user_id)
        .bind(&new.bank_name)
        .bind(&new.bank_account_number)
        .bind(new.initial_balance())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
                LedgerError::UserNotFound(new.user_id)
            }
            _ => LedgerError::Storage(e),
        })?;

        Ok(Self::row_to_account(&row))
    }

    async fn update(
        &self,
        account_id: i64,
        update: AccountUpdate,
    ) -> Result<Account, LedgerError> {
        let row = sqlx::query(&format!(
            "UPDATE accounts_tb
             SET bank_name           = COALESCE($2, bank_name),
                 bank_account_number = COALESCE($3, bank_account_number)
             WHERE account_id = $1
             RETURNING {}",
            Self::COLUMNS
        ))
        .bind(account_id)
        .bind(&update.bank_name)
        .bind(&update.bank_account_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::row_to_account(&r))
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn delete(&self, account_id: i64) -> Result<Account, LedgerError> {
        let row = sqlx::query(&format!(
            "DELETE FROM accounts_tb WHERE account_id = $1 AND balance = 0 RETURNING {}",
            Self::COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Self::row_to_account(&r)),
            // Nothing deleted: either the row is missing or its balance
            // is non-zero.
            None => {
                let exists =
                    sqlx::query_scalar::<_, i32>("SELECT 1 FROM accounts_tb WHERE account_id = $1")
                        .bind(account_id)
                        .fetch_optional(&self.pool)
                        .await?;
                match exists {
                    Some(_) => Err(LedgerError::Conflict(format!(
                        "account {} has a non-zero balance",
                        account_id
                    ))),
                    None => Err(LedgerError::AccountNotFound(account_id)),
                }
            }
        }
    }

    async fn adjust_balance(
        &self,
        account_id: i64,
        delta: Decimal,
    ) -> Result<Account, LedgerError> {
        let row = sqlx::query(&format!(
            "UPDATE accounts_tb
             SET balance = balance + $2
             WHERE account_id = $1 AND balance + $2 >= 0
             RETURNING {}",
            Self::COLUMNS
        ))
        .bind(account_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Self::row_to_account(&r)),
            None => {
                let exists =
                    sqlx::query_scalar::<_, i32>("SELECT 1 FROM accounts_tb WHERE account_id = $1")
                        .bind(account_id)
                        .fetch_optional(&self.pool)
                        .await?;
                match exists {
                    Some(_) => Err(LedgerError::InsufficientFunds),
                    None => Err(LedgerError::AccountNotFound(account_id)),
                }
            }
        }
    }
}
