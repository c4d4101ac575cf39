//! In-memory user store.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::models::{NewUser, User, UserUpdate};
use super::store::UserStore;
use crate::error::LedgerError;

pub struct MemUserStore {
    users: DashMap<i64, User>,
    next_id: AtomicI64,
}

impl Default for MemUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.user_id) != except)
    }
}

#[async_trait]
impl UserStore for MemUserStore {
    async fn create(&self, new: NewUser) -> Result<User, LedgerError> {
        if self.email_taken(&new.email, None) {
            return Err(LedgerError::Conflict(format!(
                "email already registered: {}",
                new.email
            )));
        }

        let user_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = User {
            user_id,
            name: new.name,
            email: new.email,
            password: new.password,
            created_at: Utc::now(),
        };
        self.users.insert(user_id, user.clone());
        Ok(user)
    }

    async fn get(&self, user_id: i64) -> Result<User, LedgerError> {
        self.users
            .get(&user_id)
            .map(|u| u.clone())
            .ok_or(LedgerError::UserNotFound(user_id))
    }

    async fn list(&self) -> Result<Vec<User>, LedgerError> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by_key(|u| u.user_id);
        Ok(users)
    }

    async fn update(&self, user_id: i64, update: UserUpdate) -> Result<User, LedgerError> {
        if let Some(ref email) = update.email
            && self.email_taken(email, Some(user_id))
        {
            return Err(LedgerError::Conflict(format!(
                "email already registered: {}",
                email
            )));
        }

        let mut entry = self
            .users
            .get_mut(&user_id)
            .ok_or(LedgerError::UserNotFound(user_id))?;

        if let Some(name) = update.name {
            entry.name = name;
        }
        if let Some(email) = update.email {
            entry.email = email;
        }
        if let Some(password) = update.password {
            entry.password = password;
        }
        Ok(entry.clone())
    }

    async fn delete(&self, user_id: i64) -> Result<User, LedgerError> {
        self.users
            .remove(&user_id)
            .map(|(_, u)| u)
            .ok_or(LedgerError::UserNotFound(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemUserStore::new();
        let user = store.create(new_user("alice", "a@example.com")).await.unwrap();
        assert!(user.user_id > 0);

        let fetched = store.get(user.user_id).await.unwrap();
        assert_eq!(fetched.email, "a@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemUserStore::new();
        store.create(new_user("alice", "a@example.com")).await.unwrap();

        let result = store.create(new_user("bob", "a@example.com")).await;
        assert!(matches!(result, Err(LedgerError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_partial() {
        let store = MemUserStore::new();
        let user = store.create(new_user("alice", "a@example.com")).await.unwrap();

        let updated = store
            .update(
                user.user_id,
                UserUpdate {
                    name: Some("alicia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "alicia");
        assert_eq!(updated.email, "a@example.com");
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let store = MemUserStore::new();
        let result = store.delete(42).await;
        assert!(matches!(result, Err(LedgerError::UserNotFound(42))));
    }
}
