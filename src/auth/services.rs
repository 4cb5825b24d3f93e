use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            LoginRequest, ProfileResponse, PublicUser, RegisterRequest, TokenResponse,
            MSG_LOGGED_IN, MSG_PROFILE_LOADED, MSG_REGISTERED,
        },
        jwt::JwtKeys,
        password::{hash_blocking, verify_blocking, PasswordHasher},
        repo::{CredentialStore, StoreError},
        repo_types::{NewUser, User},
    },
    error::{AuthError, AuthResult},
    state::AppState,
};

/// Register, login and profile flows over injected collaborators.
///
/// Inputs are expected to have passed [`crate::auth::validation`] already;
/// only business rules are checked here.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.store.clone(), state.hasher.clone(), state.keys.clone())
    }
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        keys: JwtKeys,
    ) -> Self {
        Self { store, hasher, keys }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> AuthResult<TokenResponse> {
        if self.store.find_user_by_email(&req.email).await?.is_some() {
            warn!("email already registered");
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = hash_blocking(self.hasher.clone(), req.password).await?;

        let keys = &self.keys;
        let mint = |user: &User| keys.sign_refresh(user.id);
        let new_user = NewUser {
            email: req.email,
            password_hash,
            name: req.name,
        };
        let (user, _profile) = match self.store.create_account(new_user, &mint).await {
            Ok(created) => created,
            Err(StoreError::Duplicate(constraint)) => {
                // lost a race against a concurrent registration
                warn!(%constraint, "email claimed concurrently");
                return Err(AuthError::DuplicateAccount);
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.keys.sign_access(user.id)?;
        info!(user_id = %user.id, "user registered");
        Ok(TokenResponse {
            msg: MSG_REGISTERED.into(),
            token,
        })
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> AuthResult<TokenResponse> {
        let Some(user) = self.store.find_user_by_email(&req.email).await? else {
            warn!("login unknown email");
            return Err(AuthError::AccountNotFound);
        };

        let ok = verify_blocking(self.hasher.clone(), req.password, user.password_hash.clone())
            .await?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.sign_access(user.id)?;
        info!(user_id = %user.id, "user logged in");
        Ok(TokenResponse {
            msg: MSG_LOGGED_IN.into(),
            token,
        })
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> AuthResult<ProfileResponse> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        Ok(ProfileResponse {
            msg: MSG_PROFILE_LOADED.into(),
            user: PublicUser {
                name: user.name,
                email: user.email,
            },
        })
    }
}
