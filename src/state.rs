use std::sync::Arc;

use axum::extract::FromRef;
use tracing::warn;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::{PasswordHasher, Passwords},
        repo::CredentialStore,
    },
    config::AppConfig,
    db::PgCredentialStore,
    memory::MemoryStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub keys: JwtKeys,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl AppState {
    /// Connects to Postgres when `DATABASE_URL` is configured, otherwise
    /// falls back to the in-memory store.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn CredentialStore> = match &config.database_url {
            Some(url) => {
                let pg = PgCredentialStore::connect(url, config.database_max_connections).await?;
                pg.migrate().await?;
                Arc::new(pg)
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory credential store");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::from_parts(&config, store))
    }

    pub fn from_parts(config: &AppConfig, store: Arc<dyn CredentialStore>) -> Self {
        let hasher = Arc::new(Passwords::new(&config.password)) as Arc<dyn PasswordHasher>;
        let keys = JwtKeys::new(&config.jwt);
        Self {
            store,
            hasher,
            keys,
        }
    }

    pub fn with_keys(mut self, keys: JwtKeys) -> Self {
        self.keys = keys;
        self
    }
}
