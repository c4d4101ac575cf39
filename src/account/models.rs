//! Data models for bank accounts

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::money::{self, Amount};

/// Bank account record
///
/// `balance` is serialized as a string so no precision is lost in JSON.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Account {
    pub account_id: i64,
    pub user_id: i64,
    pub bank_name: String,
    pub bank_account_number: String,
    #[serde(serialize_with = "money::decimal_as_str")]
    #[schema(value_type = String, example = "100.00")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Payload for account creation. The initial balance is an `Amount`,
/// which already guarantees it is non-negative.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAccount {
    pub user_id: i64,
    pub bank_name: String,
    pub bank_account_number: String,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "100.00")]
    pub balance: Option<Amount>,
}

impl NewAccount {
    pub fn initial_balance(&self) -> Decimal {
        self.balance.map(Amount::inner).unwrap_or(Decimal::ZERO)
    }
}

/// Partial update. Balance is not updatable here; balances move only
/// through the transfer engine.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AccountUpdate {
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_balance_serialized_as_string() {
        let account = Account {
            account_id: 1,
            user_id: 1,
            bank_name: "First National".to_string(),
            bank_account_number: "000123".to_string(),
            balance: Decimal::from_str("100.50").unwrap(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["balance"], "100.50");
    }

    #[test]
    fn test_new_account_default_balance_is_zero() {
        let json = r#"{"user_id":1,"bank_name":"b","bank_account_number":"1"}"#;
        let new: NewAccount = serde_json::from_str(json).unwrap();
        assert_eq!(new.initial_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_new_account_rejects_negative_balance() {
        let json = r#"{"user_id":1,"bank_name":"b","bank_account_number":"1","balance":"-5"}"#;
        let result: Result<NewAccount, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
