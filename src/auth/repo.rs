use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::db::{with_timeout, StoreError};

/// Credential store.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a user; a taken email yields `StoreError::Conflict`.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

pub struct PgUserRepo {
    db: PgPool,
    timeout: Duration,
}

impl PgUserRepo {
    pub fn new(db: PgPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let q = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, created_at, updated_at
            "#,
        )
        .bind(user.email)
        .bind(user.name)
        .bind(user.password_hash)
        .fetch_one(&self.db);
        with_timeout(self.timeout, q).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let q = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db);
        with_timeout(self.timeout, q).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let q = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db);
        with_timeout(self.timeout, q).await
    }
}
