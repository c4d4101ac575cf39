//! Storage contract for users.

use async_trait::async_trait;

use super::models::{NewUser, User, UserUpdate};
use crate::error::LedgerError;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, LedgerError>;

    async fn get(&self, user_id: i64) -> Result<User, LedgerError>;

    async fn list(&self) -> Result<Vec<User>, LedgerError>;

    async fn update(&self, user_id: i64, update: UserUpdate) -> Result<User, LedgerError>;

    /// Deleting a user that still owns accounts is a Conflict. The gateway
    /// checks ownership first; the PostgreSQL FK backstops the race.
    async fn delete(&self, user_id: i64) -> Result<User, LedgerError>;
}
