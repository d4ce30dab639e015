//! In-memory [`UserRepository`] used by handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::repo::{RepoError, UserRepository};
use super::repo_types::User;

#[derive(Default)]
struct Table {
    rows: Vec<User>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table>,
    calls: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations that reached the table.
    pub fn storage_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Drops a row behind the caller's back, as a concurrent delete would.
    pub async fn remove_silently(&self, id: i64) {
        self.table.write().await.rows.retain(|u| u.id != id);
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, mut user: User) -> Result<User, RepoError> {
        if user.password.hash().is_none() {
            return Err(RepoError::MissingPasswordHash);
        }
        self.touch();
        let mut table = self.table.write().await;
        if table.rows.iter().any(|u| u.email == user.email) {
            return Err(RepoError::DuplicateEmail);
        }
        table.next_id += 1;
        let now = OffsetDateTime::now_utc();
        user.id = table.next_id;
        user.created_at = now;
        user.updated_at = now;
        user.password.clear_plaintext();
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: i64) -> Result<User, RepoError> {
        if id < 1 {
            return Err(RepoError::NotFound);
        }
        self.touch();
        let table = self.table.read().await;
        table
            .rows
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<User>, RepoError> {
        self.touch();
        let mut rows = self.table.read().await.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn update(&self, mut user: User) -> Result<User, RepoError> {
        if user.password.hash().is_none() {
            return Err(RepoError::MissingPasswordHash);
        }
        self.touch();
        let mut table = self.table.write().await;
        if table.rows.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(RepoError::DuplicateEmail);
        }
        let Some(row) = table.rows.iter_mut().find(|u| u.id == user.id) else {
            return Err(RepoError::EditConflict);
        };
        user.updated_at = OffsetDateTime::now_utc();
        user.password.clear_plaintext();
        *row = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        if id < 1 {
            return Err(RepoError::NotFound);
        }
        self.touch();
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|u| u.id != id);
        if table.rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::password::test_hasher;
    use std::time::Duration;

    fn new_user(email: &str, username: &str, password: &str) -> User {
        let mut user = User::new(email.into(), username.into());
        user.password.set(password, &test_hasher()).unwrap();
        user
    }

    #[tokio::test]
    async fn insert_then_get_roundtrip() {
        let repo = InMemoryUserRepository::new();
        let inserted = repo.insert(new_user("a@b.com", "alice", "longenough1")).await.unwrap();

        let fetched = repo.get(inserted.id).await.unwrap();
        assert_eq!(fetched.email, "a@b.com");
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.role_id, 2);
        assert!(fetched.password.hash().is_some());
        assert!(fetched.password.plaintext().is_none());
        assert!(fetched.password.matches("longenough1").unwrap());
        assert!(!fetched.password.matches("wrong-password").unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert(new_user("a@b.com", "alice", "longenough1")).await.unwrap();
        let err = repo.insert(new_user("a@b.com", "bob", "longenough2")).await.unwrap_err();
        assert!(matches!(err, RepoError::DuplicateEmail));

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.iter().filter(|u| u.email == "a@b.com").count(), 1);
    }

    #[tokio::test]
    async fn non_positive_ids_never_touch_storage() {
        let repo = InMemoryUserRepository::new();
        assert!(matches!(repo.get(0).await, Err(RepoError::NotFound)));
        assert!(matches!(repo.get(-1).await, Err(RepoError::NotFound)));
        assert!(matches!(repo.delete(0).await, Err(RepoError::NotFound)));
        assert_eq!(repo.storage_calls(), 0);
    }

    #[tokio::test]
    async fn get_all_is_newest_first_and_empty_is_ok() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.get_all().await.unwrap().is_empty());

        repo.insert(new_user("first@b.com", "first", "longenough1")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        repo.insert(new_user("second@b.com", "second", "longenough1")).await.unwrap();

        let all = repo.get_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn update_missing_row_is_edit_conflict() {
        let repo = InMemoryUserRepository::new();
        let mut ghost = new_user("ghost@b.com", "ghost", "longenough1");
        ghost.id = 42;
        assert!(matches!(repo.update(ghost).await, Err(RepoError::EditConflict)));
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let user = repo.insert(new_user("a@b.com", "alice", "longenough1")).await.unwrap();
        repo.delete(user.id).await.unwrap();
        assert!(matches!(repo.delete(user.id).await, Err(RepoError::NotFound)));
    }
}
