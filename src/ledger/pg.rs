//! PostgreSQL transaction log.
//!
//! All status updates are CAS: `UPDATE ... WHERE status = expected`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use super::store::TransactionLog;
use super::transaction::{NewTransaction, Transaction, TransactionFilter, TransactionStatus};
use crate::error::LedgerError;

pub struct PgTransactionLog {
    pool: PgPool,
}

impl PgTransactionLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    const COLUMNS: &'static str = "transaction_id, cid, source_account_id, \
         destination_account_id, amount, status, created_at, updated_at";

    fn row_to_transaction(row: &sqlx::postgres::PgRow) -> Result<Transaction, LedgerError> {
        let status_id: i16 = row.get("status");
        let status = TransactionStatus::from_id(status_id).ok_or_else(|| {
            LedgerError::Storage(sqlx::Error::Decode(
                format!("invalid status id: {}", status_id).into(),
            ))
        })?;

        Ok(Transaction {
            transaction_id: row.get("transaction_id"),
            cid: row.get("cid"),
            source_account_id: row.get("source_account_id"),
            destination_account_id: row.get("destination_account_id"),
            amount: row.get("amount"),
            status,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl TransactionLog for PgTransactionLog {
    async fn append(&self, new: NewTransaction) -> Result<Transaction, LedgerError> {
        // Idempotency: same cid returns the existing record.
        if let Some(ref cid) = new.cid
            && let Some(existing) = self.get_by_cid(cid).await?
        {
            tracing::info!(
                transaction_id = existing.transaction_id,
                cid = %cid,
                "duplicate cid, returning existing transaction"
            );
            return Ok(existing);
        }

        let result = sqlx::query(&format!(
            "INSERT INTO transactions_tb
                 (cid, source_account_id, destination_account_id, amount, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            Self::COLUMNS
        ))
        .bind(&new.cid)
        .bind(new.source_account_id)
        .bind(new.destination_account_id)
        .bind(new.amount)
        .bind(TransactionStatus::Pending.id())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Self::row_to_transaction(&row),
            // Unique violation on cid: a racing append won, return its row.
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                let cid = new.cid.as_deref().unwrap_or_default();
                self.get_by_cid(cid)
                    .await?
                    .ok_or_else(|| LedgerError::Conflict("cid insert race lost".to_string()))
            }
            Err(e) => Err(LedgerError::Storage(e)),
        }
    }

    async fn get(&self, transaction_id: i64) -> Result<Transaction, LedgerError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM transactions_tb WHERE transaction_id = $1",
            Self::COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Self::row_to_transaction(&r),
            None => Err(LedgerError::TransactionNotFound(transaction_id)),
        }
    }

    async fn get_by_cid(&self, cid: &str) -> Result<Option<Transaction>, LedgerError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM transactions_tb WHERE cid = $1",
            Self::COLUMNS
        ))
        .bind(cid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::row_to_transaction(&r)).transpose()
    }

    async fn list(&self, filter: TransactionFilter) -> Result<Vec<Transaction>, LedgerError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transactions_tb
             WHERE ($1::bigint IS NULL
                    OR source_account_id = $1 OR destination_account_id = $1)
               AND ($2::smallint IS NULL OR status = $2)
             ORDER BY transaction_id",
            Self::COLUMNS
        ))
        .bind(filter.account_id)
        .bind(filter.status.map(|s| s.id()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    async fn transition(
        &self,
        transaction_id: i64,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<Transaction, LedgerError> {
        if !from.can_transition_to(to) {
            return Err(LedgerError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let row = sqlx::query(&format!(
            "UPDATE transactions_tb
             SET status = $3, updated_at = NOW()
             WHERE transaction_id = $1 AND status = $2
             RETURNING {}",
            Self::COLUMNS
        ))
        .bind(transaction_id)
        .bind(from.id())
        .bind(to.id())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Self::row_to_transaction(&r),
            // CAS miss: report the actual stored status.
            None => {
                let actual = self.get(transaction_id).await?;
                Err(LedgerError::InvalidStateTransition {
                    from: actual.status.to_string(),
                    to: to.to_string(),
                })
            }
        }
    }

    async fn update_amount(
        &self,
        transaction_id: i64,
        new_amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        let row = sqlx::query(&format!(
            "UPDATE transactions_tb
             SET amount = $2, updated_at = NOW()
             WHERE transaction_id = $1 AND status = $3
             RETURNING {}",
            Self::COLUMNS
        ))
        .bind(transaction_id)
        .bind(new_amount)
        .bind(TransactionStatus::Pending.id())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Self::row_to_transaction(&r),
            None => {
                // Missing row vs non-Pending row
                self.get(transaction_id).await?;
                Err(LedgerError::ImmutableRecord)
            }
        }
    }

    async fn has_active(&self, account_id: i64) -> Result<bool, LedgerError> {
        let row = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM transactions_tb
             WHERE status = $2
               AND (source_account_id = $1 OR destination_account_id = $1)
             LIMIT 1",
        )
        .bind(account_id)
        .bind(TransactionStatus::Pending.id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    async fn setup() -> Option<PgPool> {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        let db = crate::db::Database::connect(&database_url).await.ok()?;
        db.init_schema().await.ok()?;
        Some(db.pool().clone())
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_append_and_cas_transition() {
        let pool = setup().await.expect("DATABASE_URL not set");
        let log = PgTransactionLog::new(pool);

        let tx = log
            .append(NewTransaction {
                cid: Some(format!("pg-test-{}", chrono::Utc::now().timestamp_micros())),
                source_account_id: 1,
                destination_account_id: 2,
                amount: Decimal::from_str("10").unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);

        let completed = log
            .transition(
                tx.transaction_id,
                TransactionStatus::Pending,
                TransactionStatus::Completed,
            )
            .await
            .unwrap();
        assert_eq!(completed.status, TransactionStatus::Completed);

        let result = log
            .transition(
                tx.transaction_id,
                TransactionStatus::Pending,
                TransactionStatus::Failed,
            )
            .await;
        assert!(matches!(
            result,
            Err(LedgerError::InvalidStateTransition { .. })
        ));
    }
}
