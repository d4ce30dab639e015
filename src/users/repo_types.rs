use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use super::password::Password;

/// Role assigned to every newly created account.
pub const DEFAULT_ROLE_ID: i32 = 2;

/// User account as the handlers and repository see it.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip)]
    pub password: Password,
    pub role_id: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Not yet persisted; id and timestamps are placeholders until storage assigns them.
    pub fn new(email: String, username: String) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: 0,
            email,
            username,
            password: Password::default(),
            role_id: DEFAULT_ROLE_ID,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row in the `users` table.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role_id: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            email: r.email,
            username: r.username,
            password: Password::from_hash(r.password_hash),
            role_id: r.role_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
