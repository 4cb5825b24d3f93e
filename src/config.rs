use std::str::FromStr;

use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Algorithm used for new password hashes.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    Bcrypt,
    Argon2,
}

impl FromStr for PasswordScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(Self::Bcrypt),
            "argon2" => Ok(Self::Argon2),
            other => bail!("unknown password scheme `{other}`"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub scheme: PasswordScheme,
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            scheme: PasswordScheme::Bcrypt,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

pub const DEFAULT_BCRYPT_COST: u32 = 12;
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;
pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 60;
pub const DEFAULT_REFRESH_TTL_MINUTES: i64 = 60 * 24 * 2;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "credkeeper".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "credkeeper-users".into()),
            ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", DEFAULT_ACCESS_TTL_MINUTES)?,
            refresh_ttl_minutes: parse_or(
                &lookup,
                "JWT_REFRESH_TTL_MINUTES",
                DEFAULT_REFRESH_TTL_MINUTES,
            )?,
        };
        if jwt.ttl_minutes <= 0 || jwt.refresh_ttl_minutes <= 0 {
            bail!("token lifetimes must be positive");
        }

        let password = PasswordConfig {
            scheme: parse_or(&lookup, "PASSWORD_SCHEME", PasswordScheme::Bcrypt)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?,
        };
        if !BCRYPT_COST_RANGE.contains(&password.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31");
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            jwt,
            password,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}")),
        None => Ok(default),
    }
}
