//! Transaction record and status state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::money;

/// Transaction status
///
/// Legal transitions:
/// - Pending -> Completed
/// - Pending -> Failed
/// - Completed -> Reversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum TransactionStatus {
    Pending = 1,
    Completed = 2,
    Failed = 3,
    Reversed = 4,
}

impl TransactionStatus {
    /// Numeric ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from PostgreSQL ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Completed),
            3 => Some(Self::Failed),
            4 => Some(Self::Reversed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Reversed => "REVERSED",
        }
    }

    /// Whether the status edge `self -> to` is legal.
    pub fn can_transition_to(&self, to: TransactionStatus) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Completed, Self::Reversed)
        )
    }

    /// Terminal statuses accept no further transitions except
    /// Completed -> Reversed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            "REVERSED" => Ok(Self::Reversed),
            _ => Err(()),
        }
    }
}

/// Transfer record in the log
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Transaction {
    pub transaction_id: i64,
    /// Client idempotency key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    pub source_account_id: i64,
    pub destination_account_id: i64,
    #[serde(serialize_with = "money::decimal_as_str")]
    #[schema(value_type = String, example = "30.00")]
    pub amount: Decimal,
    /// PENDING | COMPLETED | FAILED | REVERSED
    #[schema(value_type = String, example = "COMPLETED")]
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction[{}] {} -> {} amount={} status={}",
            self.transaction_id,
            self.source_account_id,
            self.destination_account_id,
            self.amount,
            self.status
        )
    }
}

/// Payload for appending a new (Pending) record
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub cid: Option<String>,
    pub source_account_id: i64,
    pub destination_account_id: i64,
    pub amount: Decimal,
}

/// Listing filter; both fields optional, combined with AND.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    pub account_id: Option<i64>,
    pub status: Option<TransactionStatus>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(account_id) = self.account_id
            && tx.source_account_id != account_id
            && tx.destination_account_id != account_id
        {
            return false;
        }
        if let Some(status) = self.status
            && tx.status != status
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_id_roundtrip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
            TransactionStatus::Reversed,
        ] {
            assert_eq!(TransactionStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(TransactionStatus::from_id(0), None);
        assert_eq!(TransactionStatus::from_id(5), None);
    }

    #[test]
    fn test_legal_transitions() {
        use TransactionStatus::*;
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Completed.can_transition_to(Reversed));
    }

    #[test]
    fn test_illegal_transitions() {
        use TransactionStatus::*;
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Failed.can_transition_to(Reversed));
        assert!(!Reversed.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Reversed));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_status_serializes_screaming() {
        let json = serde_json::to_string(&TransactionStatus::Completed).unwrap();
        assert_eq!(json, r#""COMPLETED""#);
    }

    #[test]
    fn test_filter_matches_either_side() {
        let tx = Transaction {
            transaction_id: 1,
            cid: None,
            source_account_id: 10,
            destination_account_id: 20,
            amount: Decimal::ONE,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let by_source = TransactionFilter {
            account_id: Some(10),
            status: None,
        };
        let by_dest = TransactionFilter {
            account_id: Some(20),
            status: None,
        };
        let by_other = TransactionFilter {
            account_id: Some(30),
            status: None,
        };
        let by_status = TransactionFilter {
            account_id: Some(10),
            status: Some(TransactionStatus::Pending),
        };

        assert!(by_source.matches(&tx));
        assert!(by_dest.matches(&tx));
        assert!(!by_other.matches(&tx));
        assert!(!by_status.matches(&tx));
    }
}
