//! Transfer engine.
//!
//! Orchestrates a transfer as one atomic unit: append the Pending record,
//! debit the source, credit the destination, finalize the record. Any
//! failure after the debit triggers the compensating re-credit before the
//! record is failed, so no observer sees a half-applied transfer.
//!
//! Both account locks are held across the unit (ascending id order, see
//! `locks`). The debit/credit/finalize section runs on a detached task:
//! once the debit lands, a caller dropping the request cannot strand the
//! funds in flight.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::account::{Account, AccountStore};
use crate::error::LedgerError;
use crate::ledger::{NewTransaction, Transaction, TransactionLog, TransactionStatus};
use crate::money::Amount;

use super::locks::{AccountLocks, PairGuard};

pub struct TransferEngine {
    accounts: Arc<dyn AccountStore>,
    log: Arc<dyn TransactionLog>,
    locks: AccountLocks,
    lock_timeout: Duration,
}

impl TransferEngine {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        log: Arc<dyn TransactionLog>,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            accounts,
            log,
            locks: AccountLocks::new(),
            lock_timeout,
        }
    }

    /// Execute a transfer between two accounts.
    ///
    /// Preconditions are checked before any mutation; each failure kind is
    /// distinct. With a `cid`, a replayed request returns the original
    /// record without moving funds again.
    pub async fn transfer(
        &self,
        source_account_id: i64,
        destination_account_id: i64,
        amount: Amount,
        cid: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }
        if source_account_id == destination_account_id {
            return Err(LedgerError::SelfTransfer);
        }
        self.accounts.get(source_account_id).await?;
        self.accounts.get(destination_account_id).await?;

        if let Some(ref cid) = cid
            && let Some(existing) = self.log.get_by_cid(cid).await?
        {
            info!(
                transaction_id = existing.transaction_id,
                cid = %cid,
                "duplicate cid, returning recorded transaction"
            );
            return Ok(existing);
        }

        let tx = self
            .log
            .append(NewTransaction {
                cid,
                source_account_id,
                destination_account_id,
                amount: amount.inner(),
            })
            .await?;

        // append is idempotent on cid as well; a record that lost the race
        // arrives here already executed.
        if tx.status != TransactionStatus::Pending {
            return Ok(tx);
        }

        let guard = match self
            .locks
            .acquire_pair(source_account_id, destination_account_id, self.lock_timeout)
            .await
        {
            Ok(guard) => guard,
            Err(LedgerError::Timeout) => {
                warn!(
                    transaction_id = tx.transaction_id,
                    "lock acquisition timed out, failing transaction"
                );
                if let Err(e) = self
                    .log
                    .transition(
                        tx.transaction_id,
                        TransactionStatus::Pending,
                        TransactionStatus::Failed,
                    )
                    .await
                {
                    match e {
                        // A racing replay already finalized the record.
                        LedgerError::InvalidStateTransition { .. } => {}
                        other => return Err(other),
                    }
                }
                return Err(LedgerError::Timeout);
            }
            Err(e) => return Err(e),
        };

        self.run_detached(apply_transfer(
            self.accounts.clone(),
            self.log.clone(),
            tx,
            guard,
        ))
        .await
    }

    /// Amend the amount of a transaction that has not executed yet.
    /// Completed transfers are immutable history.
    pub async fn update_amount(
        &self,
        transaction_id: i64,
        new_amount: Amount,
    ) -> Result<Transaction, LedgerError> {
        if !new_amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }

        let tx = self.log.get(transaction_id).await?;
        if tx.status != TransactionStatus::Pending {
            return Err(LedgerError::ImmutableRecord);
        }

        // Serialize against an in-flight execution of this record; the
        // log's CAS on Pending backstops the remaining race.
        let _guard = self
            .locks
            .acquire_pair(
                tx.source_account_id,
                tx.destination_account_id,
                self.lock_timeout,
            )
            .await?;
        self.log
            .update_amount(transaction_id, new_amount.inner())
            .await
    }

    /// Reverse a Completed transfer: debit the destination, credit the
    /// source, transition to Reversed. InsufficientFunds is reported when
    /// the destination no longer covers the amount.
    pub async fn reverse(&self, transaction_id: i64) -> Result<Transaction, LedgerError> {
        let tx = self.log.get(transaction_id).await?;
        if tx.status != TransactionStatus::Completed {
            return Err(LedgerError::InvalidStateTransition {
                from: tx.status.to_string(),
                to: TransactionStatus::Reversed.to_string(),
            });
        }

        let guard = self
            .locks
            .acquire_pair(
                tx.source_account_id,
                tx.destination_account_id,
                self.lock_timeout,
            )
            .await?;

        self.run_detached(apply_reversal(
            self.accounts.clone(),
            self.log.clone(),
            tx,
            guard,
        ))
        .await
    }

    /// Delete an account. Conflict while its balance is non-zero or a
    /// transaction touching it is still Pending.
    pub async fn close_account(&self, account_id: i64) -> Result<Account, LedgerError> {
        let guard = self.locks.acquire(account_id, self.lock_timeout).await?;

        if self.log.has_active(account_id).await? {
            return Err(LedgerError::Conflict(format!(
                "account {} has pending transactions",
                account_id
            )));
        }

        let deleted = self.accounts.delete(account_id).await?;
        drop(guard);
        self.locks.forget(account_id);
        Ok(deleted)
    }

    /// Run a balance-moving section to completion on a detached task.
    /// The caller's future may be dropped; the section may not.
    async fn run_detached(
        &self,
        section: impl Future<Output = Result<Transaction, LedgerError>> + Send + 'static,
    ) -> Result<Transaction, LedgerError> {
        match tokio::spawn(section).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            // Runtime shutdown; the caller retries after restart.
            Err(_) => Err(LedgerError::Timeout),
        }
    }
}

async fn apply_transfer(
    accounts: Arc<dyn AccountStore>,
    log: Arc<dyn TransactionLog>,
    tx: Transaction,
    guard: PairGuard,
) -> Result<Transaction, LedgerError> {
    let _guard = guard;

    // Re-read under the locks: a racing replay of the same cid may have
    // executed the record, and a pending-amount amendment may have
    // changed what must move.
    let tx = log.get(tx.transaction_id).await?;
    if tx.status != TransactionStatus::Pending {
        return Ok(tx);
    }
    let amount = tx.amount;

    if let Err(e) = accounts.adjust_balance(tx.source_account_id, -amount).await {
        warn!(
            transaction_id = tx.transaction_id,
            error = %e,
            "debit failed, failing transaction"
        );
        log.transition(
            tx.transaction_id,
            TransactionStatus::Pending,
            TransactionStatus::Failed,
        )
        .await?;
        return Err(e);
    }

    if let Err(e) = accounts
        .adjust_balance(tx.destination_account_id, amount)
        .await
    {
        warn!(
            transaction_id = tx.transaction_id,
            error = %e,
            "credit failed, re-crediting source"
        );
        if let Err(comp_err) = accounts.adjust_balance(tx.source_account_id, amount).await {
            // Funds are missing from both accounts; operator must step in.
            error!(
                transaction_id = tx.transaction_id,
                error = %comp_err,
                "compensation failed, source not re-credited"
            );
        }
        log.transition(
            tx.transaction_id,
            TransactionStatus::Pending,
            TransactionStatus::Failed,
        )
        .await?;
        return Err(e);
    }

    let completed = log
        .transition(
            tx.transaction_id,
            TransactionStatus::Pending,
            TransactionStatus::Completed,
        )
        .await?;
    info!(
        transaction_id = completed.transaction_id,
        source = completed.source_account_id,
        destination = completed.destination_account_id,
        amount = %completed.amount,
        "transfer committed"
    );
    Ok(completed)
}

async fn apply_reversal(
    accounts: Arc<dyn AccountStore>,
    log: Arc<dyn TransactionLog>,
    tx: Transaction,
    guard: PairGuard,
) -> Result<Transaction, LedgerError> {
    let _guard = guard;

    // Re-check under the locks; a racing reversal may have won.
    let tx = log.get(tx.transaction_id).await?;
    if tx.status != TransactionStatus::Completed {
        return Err(LedgerError::InvalidStateTransition {
            from: tx.status.to_string(),
            to: TransactionStatus::Reversed.to_string(),
        });
    }
    let amount = tx.amount;

    accounts
        .adjust_balance(tx.destination_account_id, -amount)
        .await?;

    if let Err(e) = accounts.adjust_balance(tx.source_account_id, amount).await {
        warn!(
            transaction_id = tx.transaction_id,
            error = %e,
            "reversal credit failed, re-crediting destination"
        );
        if let Err(comp_err) = accounts
            .adjust_balance(tx.destination_account_id, amount)
            .await
        {
            error!(
                transaction_id = tx.transaction_id,
                error = %comp_err,
                "compensation failed, destination not re-credited"
            );
        }
        return Err(e);
    }

    let reversed = log
        .transition(
            tx.transaction_id,
            TransactionStatus::Completed,
            TransactionStatus::Reversed,
        )
        .await?;
    info!(
        transaction_id = reversed.transaction_id,
        "transfer reversed"
    );
    Ok(reversed)
}
