use std::{future::Future, time::Duration};

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;

use super::repo_types::{User, UserRow};

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("duplicate email")]
    DuplicateEmail,
    #[error("record not found")]
    NotFound,
    #[error("edit conflict")]
    EditConflict,
    #[error("refusing to persist user without a password hash")]
    MissingPasswordHash,
    #[error("{0} timed out after {1:?}")]
    Timeout(&'static str, Duration),
    #[error("{0} failed: {1}")]
    Database(&'static str, #[source] sqlx::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Storage assigns `id`, `created_at` and `updated_at`.
    async fn insert(&self, user: User) -> Result<User, RepoError>;
    async fn get(&self, id: i64) -> Result<User, RepoError>;
    /// Most recently created first.
    async fn get_all(&self) -> Result<Vec<User>, RepoError>;
    /// Overwrites every mutable column of the row keyed by `user.id`.
    async fn update(&self, user: User) -> Result<User, RepoError>;
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
    timeout: Duration,
}

impl PgUserRepository {
    pub fn new(db: PgPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, RepoError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(|e| classify(op, e)),
            Err(_) => Err(RepoError::Timeout(op, self.timeout)),
        }
    }
}

fn classify(op: &'static str, e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) {
            return RepoError::DuplicateEmail;
        }
    }
    RepoError::Database(op, e)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, mut user: User) -> Result<User, RepoError> {
        let hash = user.password.hash().ok_or(RepoError::MissingPasswordHash)?;
        let (id, created_at, updated_at) = self
            .bounded(
                "insert user",
                sqlx::query_as::<_, (i64, OffsetDateTime, OffsetDateTime)>(
                    r#"
                    INSERT INTO users (email, username, password_hash, role_id)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, created_at, updated_at
                    "#,
                )
                .bind(&user.email)
                .bind(&user.username)
                .bind(hash)
                .bind(user.role_id)
                .fetch_one(&self.db),
            )
            .await?;

        user.id = id;
        user.created_at = created_at;
        user.updated_at = updated_at;
        debug!(user_id = id, "user inserted");
        Ok(user)
    }

    async fn get(&self, id: i64) -> Result<User, RepoError> {
        if id < 1 {
            return Err(RepoError::NotFound);
        }
        let row = self
            .bounded(
                "get user",
                sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT id, email, username, password_hash, role_id, created_at, updated_at
                    FROM users
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.db),
            )
            .await?;
        row.map(User::from).ok_or(RepoError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<User>, RepoError> {
        let rows = self
            .bounded(
                "list users",
                sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT id, email, username, password_hash, role_id, created_at, updated_at
                    FROM users
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .fetch_all(&self.db),
            )
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update(&self, mut user: User) -> Result<User, RepoError> {
        let hash = user.password.hash().ok_or(RepoError::MissingPasswordHash)?;
        let updated_at = self
            .bounded(
                "update user",
                sqlx::query_scalar::<_, OffsetDateTime>(
                    r#"
                    UPDATE users
                    SET username = $1, email = $2, password_hash = $3, role_id = $4,
                        updated_at = NOW()
                    WHERE id = $5
                    RETURNING updated_at
                    "#,
                )
                .bind(&user.username)
                .bind(&user.email)
                .bind(hash)
                .bind(user.role_id)
                .bind(user.id)
                .fetch_optional(&self.db),
            )
            .await?
            .ok_or(RepoError::EditConflict)?;

        user.updated_at = updated_at;
        debug!(user_id = user.id, "user updated");
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        if id < 1 {
            return Err(RepoError::NotFound);
        }
        let result = self
            .bounded(
                "delete user",
                sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id)
                    .execute(&self.db),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        debug!(user_id = id, "user deleted");
        Ok(())
    }
}
