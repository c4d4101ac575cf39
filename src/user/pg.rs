//! PostgreSQL user store.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::models::{NewUser, User, UserUpdate};
use super::store::UserStore;
use crate::error::LedgerError;

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::postgres::PgRow) -> User {
        User {
            user_id: row.get("user_id"),
            name: row.get("name"),
            email: row.get("email"),
            password: row.get("password"),
            created_at: row.get("created_at"),
        }
    }
}

/// Map constraint violations to domain errors, pass the rest through.
fn map_pg_error(e: sqlx::Error, what: &str) -> LedgerError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.code().as_deref() {
            // unique_violation
            Some("23505") => return LedgerError::Conflict(format!("{} already exists", what)),
            // foreign_key_violation
            Some("23503") => return LedgerError::Conflict(format!("{} is still referenced", what)),
            _ => {}
        }
    }
    LedgerError::Storage(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser) -> Result<User, LedgerError> {
        let row = sqlx::query(
            r#"INSERT INTO users_tb (name, email, password)
               VALUES ($1, $2, $3)
               RETURNING user_id, name, email, password, created_at"#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_pg_error(e, "email"))?;

        Ok(Self::row_to_user(&row))
    }

    async fn get(&self, user_id: i64) -> Result<User, LedgerError> {
        let row = sqlx::query(
            r#"SELECT user_id, name, email, password, created_at
               FROM users_tb WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::row_to_user(&r))
            .ok_or(LedgerError::UserNotFound(user_id))
    }

    async fn list(&self) -> Result<Vec<User>, LedgerError> {
        let rows = sqlx::query(
            r#"SELECT user_id, name, email, password, created_at
               FROM users_tb ORDER BY user_id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_user).collect())
    }

    async fn update(&self, user_id: i64, update: UserUpdate) -> Result<User, LedgerError> {
        let row = sqlx::query(
            r#"UPDATE users_tb
               SET name     = COALESCE($2, name),
                   email    = COALESCE($3, email),
                   password = COALESCE($4, password)
               WHERE user_id = $1
               RETURNING user_id, name, email, password, created_at"#,
        )
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.password)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_pg_error(e, "email"))?;

        row.map(|r| Self::row_to_user(&r))
            .ok_or(LedgerError::UserNotFound(user_id))
    }

    async fn delete(&self, user_id: i64) -> Result<User, LedgerError> {
        let row = sqlx::query(
            r#"DELETE FROM users_tb WHERE user_id = $1
               RETURNING user_id, name, email, password, created_at"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_pg_error(e, "user"))?;

        row.map(|r| Self::row_to_user(&r))
            .ok_or(LedgerError::UserNotFound(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_pool() -> Option<PgPool> {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await
            .ok()
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_user_crud_roundtrip() {
        let pool = create_test_pool().await.expect("DATABASE_URL not set");
        crate::db::Database::connect(&std::env::var("DATABASE_URL").unwrap())
            .await
            .unwrap()
            .init_schema()
            .await
            .unwrap();

        let store = PgUserStore::new(pool);
        let email = format!("pg_user_{}@example.com", chrono::Utc::now().timestamp_micros());

        let user = store
            .create(NewUser {
                name: "pg test".to_string(),
                email: email.clone(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        let fetched = store.get(user.user_id).await.unwrap();
        assert_eq!(fetched.email, email);

        let deleted = store.delete(user.user_id).await.unwrap();
        assert_eq!(deleted.user_id, user.user_id);
        assert!(matches!(
            store.get(user.user_id).await,
            Err(LedgerError::UserNotFound(_))
        ));
    }
}
