use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, Profile, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Mints the refresh token for a freshly created user inside the
/// create-account unit of work.
pub type RefreshMinter<'a> = &'a (dyn Fn(&User) -> anyhow::Result<String> + Send + Sync);

/// Persistence port for users and their profiles.
///
/// Implementations enforce a unique email per user and a single profile per
/// user. `create_account` writes both records atomically: either the user and
/// its profile become visible together, or neither does.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;

    async fn create_account(
        &self,
        user: NewUser,
        mint_refresh: RefreshMinter<'_>,
    ) -> Result<(User, Profile), StoreError>;
}
