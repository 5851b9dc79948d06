//! Server Configuration
//!
//! Everything the server needs from the environment. The token signing
//! secret is never compiled in: release builds refuse to start without
//! `AUTH_TOKEN_SECRET`, debug builds fall back to a random per-process key.

use std::env;
use std::str::FromStr;

use anyhow::{Context, bail};
use auth::AuthConfig;
use base64::Engine;
use base64::engine::general_purpose;
use chrono::Duration;
use platform::secret::SecretKey;

const DEFAULT_PORT: u16 = 31113;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug)]
pub struct ApiConfig {
    pub database_url: String,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let port = parse_var("PORT")?.unwrap_or(DEFAULT_PORT);

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url,
            port,
            frontend_origins,
            auth: auth_config_from_env()?,
        })
    }
}

fn auth_config_from_env() -> anyhow::Result<AuthConfig> {
    let config = match env::var("AUTH_TOKEN_SECRET") {
        Ok(encoded) => AuthConfig::new(
            SecretKey::from_base64(&encoded).context("AUTH_TOKEN_SECRET is not a valid key")?,
        ),
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("AUTH_TOKEN_SECRET not set, using a random development key");
            AuthConfig::development()
        }
        Err(_) => bail!("AUTH_TOKEN_SECRET must be set in production"),
    };

    let previous = env::var("AUTH_TOKEN_PREVIOUS_SECRET")
        .ok()
        .map(|encoded| SecretKey::from_base64(&encoded))
        .transpose()
        .context("AUTH_TOKEN_PREVIOUS_SECRET is not a valid key")?;

    let pepper = env::var("AUTH_PASSWORD_PEPPER")
        .ok()
        .map(|encoded| general_purpose::STANDARD.decode(encoded.trim()))
        .transpose()
        .context("AUTH_PASSWORD_PEPPER must be base64")?;

    let mut config = config.with_previous_secret(previous).with_pepper(pepper);

    if let Some(secs) = parse_var("AUTH_TOKEN_TTL_SECS")? {
        let ttl = bounded_secs("AUTH_TOKEN_TTL_SECS", secs, AuthConfig::MAX_TOKEN_TTL_SECS)?;
        config = config.with_token_ttl(ttl);
    }

    let max_failures = match parse_var("AUTH_MAX_LOGIN_FAILURES")? {
        Some(value) => bounded_failures(value)?,
        None => config.max_login_failures,
    };
    let lockout = match parse_var("AUTH_LOCKOUT_SECS")? {
        Some(secs) => bounded_secs("AUTH_LOCKOUT_SECS", secs, AuthConfig::MAX_LOCKOUT_SECS)?,
        None => config.lockout,
    };

    Ok(config.with_lockout(max_failures, lockout))
}

/// A positive number of seconds no larger than `max`
fn bounded_secs(name: &str, secs: i64, max: i64) -> anyhow::Result<Duration> {
    if secs <= 0 {
        bail!("{name} must be positive");
    }
    if secs > max {
        bail!("{name} must be at most {max}");
    }
    Ok(Duration::seconds(secs))
}

fn bounded_failures(value: u16) -> anyhow::Result<u16> {
    if value == 0 {
        bail!("AUTH_MAX_LOGIN_FAILURES must be at least 1");
    }
    if value > AuthConfig::MAX_LOGIN_FAILURES_LIMIT {
        bail!(
            "AUTH_MAX_LOGIN_FAILURES must be at most {}",
            AuthConfig::MAX_LOGIN_FAILURES_LIMIT
        );
    }
    Ok(value)
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} is not valid")),
        Err(_) => Ok(None),
    }
}
