use std::sync::Arc;

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::{PasswordConfig, PasswordScheme};

/// One-way salted password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` cannot be parsed.
    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool>;
}

/// Hashes with the configured scheme and verifies either format, picked by
/// the stored hash prefix.
#[derive(Debug, Clone)]
pub struct Passwords {
    scheme: PasswordScheme,
    bcrypt_cost: u32,
}

impl Passwords {
    pub fn new(cfg: &PasswordConfig) -> Self {
        Self {
            scheme: cfg.scheme,
            bcrypt_cost: cfg.bcrypt_cost,
        }
    }
}

impl PasswordHasher for Passwords {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        match self.scheme {
            PasswordScheme::Bcrypt => hash_bcrypt(plain, self.bcrypt_cost),
            PasswordScheme::Argon2 => hash_argon2(plain),
        }
    }

    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        if hash.starts_with("$argon2") {
            verify_argon2(plain, hash)
        } else {
            verify_bcrypt(plain, hash)
        }
    }
}

/// Longest input bcrypt hashes without truncating.
pub const BCRYPT_MAX_BYTES: usize = 72;

pub fn hash_bcrypt(plain: &str, cost: u32) -> anyhow::Result<String> {
    if plain.len() > BCRYPT_MAX_BYTES {
        anyhow::bail!("password exceeds {BCRYPT_MAX_BYTES} bytes");
    }
    bcrypt::hash(plain, cost).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::anyhow!("failed to hash password: {e}")
    })
}

pub fn verify_bcrypt(plain: &str, hash: &str) -> anyhow::Result<bool> {
    // anything longer would be compared on its 72-byte prefix only
    if plain.len() > BCRYPT_MAX_BYTES {
        return Ok(false);
    }
    bcrypt::verify(plain, hash).map_err(|e| {
        error!(error = %e, "bcrypt parse hash error");
        anyhow::anyhow!("failed to verify password: {e}")
    })
}

pub fn hash_argon2(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_argon2(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Runs the hash on the blocking pool; work factors make it too slow for a
/// runtime worker.
pub async fn hash_blocking(hasher: Arc<dyn PasswordHasher>, plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hasher.hash(&plain))
        .await
        .context("password hashing task panicked")?
}

pub async fn verify_blocking(
    hasher: Arc<dyn PasswordHasher>,
    plain: String,
    hash: String,
) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
        .await
        .context("password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bcrypt_fast() -> Passwords {
        Passwords::new(&PasswordConfig {
            scheme: PasswordScheme::Bcrypt,
            bcrypt_cost: 4,
        })
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let passwords = bcrypt_fast();
        let hash = passwords.hash("Secur3P@ssw0rd!").expect("hashing should succeed");
        assert_ne!(hash, "Secur3P@ssw0rd!");
        assert!(passwords.verify("Secur3P@ssw0rd!", &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let passwords = bcrypt_fast();
        let hash = passwords.hash("correct-horse-battery-staple").unwrap();
        assert!(!passwords.verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let passwords = bcrypt_fast();
        let a = passwords.hash("secret1").unwrap();
        let b = passwords.hash("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn default_cost_is_stamped_into_the_hash() {
        let hash = hash_bcrypt("secret1", 12).unwrap();
        assert!(hash.starts_with("$2b$12$"), "got {hash}");
    }

    #[test]
    fn bcrypt_refuses_input_it_would_truncate() {
        let at_limit = "a".repeat(BCRYPT_MAX_BYTES);
        let hash = hash_bcrypt(&at_limit, 4).unwrap();
        assert!(verify_bcrypt(&at_limit, &hash).unwrap());
        assert!(!verify_bcrypt(&format!("{at_limit}Y"), &hash).unwrap());
        assert!(hash_bcrypt(&format!("{at_limit}X"), 4).is_err());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = bcrypt_fast().verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn argon2_hashes_still_verify_under_bcrypt_scheme() {
        let legacy = hash_argon2("secret1").unwrap();
        let passwords = bcrypt_fast();
        assert!(passwords.verify("secret1", &legacy).unwrap());
        assert!(!passwords.verify("secret2", &legacy).unwrap());
    }

    #[test]
    fn argon2_scheme_produces_phc_strings() {
        let passwords = Passwords::new(&PasswordConfig {
            scheme: PasswordScheme::Argon2,
            bcrypt_cost: 4,
        });
        let hash = passwords.hash("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(passwords.verify("secret1", &hash).unwrap());
    }

    #[tokio::test]
    async fn blocking_helpers_roundtrip() {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(bcrypt_fast());
        let hash = hash_blocking(hasher.clone(), "secret1".into()).await.unwrap();
        assert!(verify_blocking(hasher.clone(), "secret1".into(), hash.clone()).await.unwrap());
        assert!(!verify_blocking(hasher, "secret2".into(), hash).await.unwrap());
    }
}
