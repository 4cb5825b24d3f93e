use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{
    repo::{CredentialStore, RefreshMinter, StoreError},
    repo_types::{NewUser, Profile, User},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
    profiles: HashMap<Uuid, Profile>,
}

/// Process-local credential store with the same uniqueness and atomicity
/// guarantees as the Postgres one. Every operation holds the lock for its
/// whole duration.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    operations: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls served so far.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn profile_count(&self) -> usize {
        self.tables.read().await.profiles.len()
    }

    fn touch(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.touch();
        let tables = self.tables.read().await;
        Ok(tables
            .by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.touch();
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.touch();
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn create_account(
        &self,
        new_user: NewUser,
        mint_refresh: RefreshMinter<'_>,
    ) -> Result<(User, Profile), StoreError> {
        self.touch();
        let mut tables = self.tables.write().await;
        if tables.by_email.contains_key(&new_user.email) {
            return Err(StoreError::Duplicate("users_email_key".into()));
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            created_at: now,
        };
        // nothing is written until the refresh token exists
        let refresh_token = mint_refresh(&user)?;
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: user.id,
            refresh_token,
            created_at: now,
        };

        tables.by_email.insert(user.email.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        tables.profiles.insert(user.id, profile.clone());
        Ok((user, profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "$2b$04$not-a-real-hash".into(),
            name: "Ana".into(),
        }
    }

    fn mint_ok(user: &User) -> anyhow::Result<String> {
        Ok(format!("refresh-{}", user.id))
    }

    #[tokio::test]
    async fn create_account_links_profile_to_user() {
        let store = MemoryStore::new();
        let (user, profile) = store.create_account(new_user("a@x.com"), &mint_ok).await.unwrap();
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.refresh_token, format!("refresh-{}", user.id));

        let found = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_user_by_id(user.id).await.unwrap().is_some());
        assert!(store.find_profile(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_at_write_time() {
        let store = MemoryStore::new();
        store.create_account(new_user("a@x.com"), &mint_ok).await.unwrap();
        let err = store
            .create_account(new_user("a@x.com"), &mint_ok)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn failed_mint_leaves_nothing_behind() {
        let store = MemoryStore::new();
        let fail = |_: &User| -> anyhow::Result<String> { anyhow::bail!("signer unavailable") };
        let err = store.create_account(new_user("a@x.com"), &fail).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(store.user_count().await, 0);
        assert_eq!(store.profile_count().await, 0);
        assert!(store.find_user_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn operations_are_counted() {
        let store = MemoryStore::new();
        assert_eq!(store.operations(), 0);
        store.find_user_by_email("a@x.com").await.unwrap();
        store.find_user_by_id(Uuid::new_v4()).await.unwrap();
        assert_eq!(store.operations(), 2);
    }
}
