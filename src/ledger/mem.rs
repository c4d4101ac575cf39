//! In-memory transaction log.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;

use super::store::TransactionLog;
use super::transaction::{NewTransaction, Transaction, TransactionFilter, TransactionStatus};
use crate::error::LedgerError;

pub struct MemTransactionLog {
    transactions: DashMap<i64, Transaction>,
    /// cid -> transaction_id, for idempotent append
    cid_index: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl Default for MemTransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemTransactionLog {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
            cid_index: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn insert_record(&self, new: NewTransaction) -> Transaction {
        let transaction_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let tx = Transaction {
            transaction_id,
            cid: new.cid,
            source_account_id: new.source_account_id,
            destination_account_id: new.destination_account_id,
            amount: new.amount,
            status: TransactionStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.transactions.insert(transaction_id, tx.clone());
        tx
    }
}

#[async_trait]
impl TransactionLog for MemTransactionLog {
    async fn append(&self, new: NewTransaction) -> Result<Transaction, LedgerError> {
        match new.cid.clone() {
            // The cid index entry guard makes the lookup-or-insert atomic,
            // so two racing appends with the same cid produce one record.
            Some(cid) => match self.cid_index.entry(cid) {
                Entry::Occupied(entry) => {
                    let existing_id = *entry.get();
                    tracing::info!(
                        transaction_id = existing_id,
                        cid = %entry.key(),
                        "duplicate cid, returning existing transaction"
                    );
                    self.transactions
                        .get(&existing_id)
                        .map(|t| t.clone())
                        .ok_or(LedgerError::TransactionNotFound(existing_id))
                }
                Entry::Vacant(entry) => {
                    let tx = self.insert_record(new);
                    entry.insert(tx.transaction_id);
                    Ok(tx)
                }
            },
            None => Ok(self.insert_record(new)),
        }
    }

    async fn get(&self, transaction_id: i64) -> Result<Transaction, LedgerError> {
        self.transactions
            .get(&transaction_id)
            .map(|t| t.clone())
            .ok_or(LedgerError::TransactionNotFound(transaction_id))
    }

    async fn get_by_cid(&self, cid: &str) -> Result<Option<Transaction>, LedgerError> {
        match self.cid_index.get(cid) {
            Some(id) => Ok(self.transactions.get(&id).map(|t| t.clone())),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: TransactionFilter) -> Result<Vec<Transaction>, LedgerError> {
        let mut txs: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| filter.matches(t))
            .map(|t| t.clone())
            .collect();
        txs.sort_by_key(|t| t.transaction_id);
        Ok(txs)
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

        let mut entry = self
            .transactions
            .get_mut(&transaction_id)
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        if entry.status != from {
            return Err(LedgerError::InvalidStateTransition {
                from: entry.status.to_string(),
                to: to.to_string(),
            });
        }

        entry.status = to;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn update_amount(
        &self,
        transaction_id: i64,
        new_amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        let mut entry = self
            .transactions
            .get_mut(&transaction_id)
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        if entry.status != TransactionStatus::Pending {
            return Err(LedgerError::ImmutableRecord);
        }

        entry.amount = new_amount;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn has_active(&self, account_id: i64) -> Result<bool, LedgerError> {
        Ok(self.transactions.iter().any(|t| {
            t.status == TransactionStatus::Pending
                && (t.source_account_id == account_id || t.destination_account_id == account_id)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn new_tx(source: i64, dest: i64, amount: &str) -> NewTransaction {
        NewTransaction {
            cid: None,
            source_account_id: source,
            destination_account_id: dest,
            amount: Decimal::from_str(amount).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_append_ids_are_monotonic() {
        let log = MemTransactionLog::new();
        let a = log.append(new_tx(1, 2, "10")).await.unwrap();
        let b = log.append(new_tx(2, 3, "20")).await.unwrap();
        assert!(b.transaction_id > a.transaction_id);
        assert_eq!(a.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_append_idempotent_on_cid() {
        let log = MemTransactionLog::new();
        let mut tx = new_tx(1, 2, "10");
        tx.cid = Some("client-key-1".to_string());

        let first = log.append(tx.clone()).await.unwrap();
        let second = log.append(tx).await.unwrap();
        assert_eq!(first.transaction_id, second.transaction_id);

        let found = log.get_by_cid("client-key-1").await.unwrap();
        assert_eq!(found.unwrap().transaction_id, first.transaction_id);
    }

    #[tokio::test]
    async fn test_transition_cas() {
        let log = MemTransactionLog::new();
        let tx = log.append(new_tx(1, 2, "10")).await.unwrap();

        let completed = log
            .transition(
                tx.transaction_id,
                TransactionStatus::Pending,
                TransactionStatus::Completed,
            )
            .await
            .unwrap();
        assert_eq!(completed.status, TransactionStatus::Completed);

        // Stored status no longer matches Pending
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

    #[tokio::test]
    async fn test_illegal_edge_rejected() {
        let log = MemTransactionLog::new();
        let tx = log.append(new_tx(1, 2, "10")).await.unwrap();
        log.transition(
            tx.transaction_id,
            TransactionStatus::Pending,
            TransactionStatus::Failed,
        )
        .await
        .unwrap();

        let result = log
            .transition(
                tx.transaction_id,
                TransactionStatus::Failed,
                TransactionStatus::Reversed,
            )
            .await;
        assert!(matches!(
            result,
            Err(LedgerError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_amount_only_while_pending() {
        let log = MemTransactionLog::new();
        let tx = log.append(new_tx(1, 2, "10")).await.unwrap();

        let updated = log
            .update_amount(tx.transaction_id, Decimal::from_str("15").unwrap())
            .await
            .unwrap();
        assert_eq!(updated.amount, Decimal::from_str("15").unwrap());

        log.transition(
            tx.transaction_id,
            TransactionStatus::Pending,
            TransactionStatus::Completed,
        )
        .await
        .unwrap();

        let result = log
            .update_amount(tx.transaction_id, Decimal::from_str("20").unwrap())
            .await;
        assert!(matches!(result, Err(LedgerError::ImmutableRecord)));
    }

    #[tokio::test]
    async fn test_has_active() {
        let log = MemTransactionLog::new();
        let tx = log.append(new_tx(1, 2, "10")).await.unwrap();

        assert!(log.has_active(1).await.unwrap());
        assert!(log.has_active(2).await.unwrap());
        assert!(!log.has_active(3).await.unwrap());

        log.transition(
            tx.transaction_id,
            TransactionStatus::Pending,
            TransactionStatus::Completed,
        )
        .await
        .unwrap();
        assert!(!log.has_active(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_filtered() {
        let log = MemTransactionLog::new();
        log.append(new_tx(1, 2, "10")).await.unwrap();
        let t2 = log.append(new_tx(2, 3, "20")).await.unwrap();
        log.transition(
            t2.transaction_id,
            TransactionStatus::Pending,
            TransactionStatus::Completed,
        )
        .await
        .unwrap();

        let all = log.list(TransactionFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let for_account_2 = log
            .list(TransactionFilter {
                account_id: Some(2),
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(for_account_2.len(), 2);

        let completed = log
            .list(TransactionFilter {
                account_id: None,
                status: Some(TransactionStatus::Completed),
            })
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].transaction_id, t2.transaction_id);
    }
}
