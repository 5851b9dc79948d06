//! Application Configuration
//!
//! Configuration for the Auth application layer. The signing secret is
//! always supplied by the caller; there is no built-in key.

use std::fmt;

use chrono::Duration;
use platform::secret::SecretKey;

use crate::application::route_policy::RoutePolicy;
use crate::application::token_codec::TokenKeys;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Signs and verifies new tokens
    pub token_secret: SecretKey,
    /// Verifies only; lets outstanding tokens survive one key rotation
    pub previous_token_secret: Option<SecretKey>,
    /// Token validity window (10 hours)
    pub token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Routes reachable without a bearer token
    pub route_policy: RoutePolicy,
    /// Consecutive failures before temporary lockout
    pub max_login_failures: u16,
    /// Lockout duration (15 minutes)
    pub lockout: Duration,
}

impl AuthConfig {
    pub const DEFAULT_TOKEN_TTL_SECS: i64 = 10 * 3600;
    pub const DEFAULT_MAX_LOGIN_FAILURES: u16 = 5;
    pub const DEFAULT_LOCKOUT_SECS: i64 = 15 * 60;

    /// Upper bound for the token TTL (30 days)
    pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 3600;
    /// Upper bound for the lockout duration (7 days)
    pub const MAX_LOCKOUT_SECS: i64 = 7 * 24 * 3600;
    /// Upper bound for the failure threshold; counts are stored as SMALLINT
    pub const MAX_LOGIN_FAILURES_LIMIT: u16 = 1000;

    pub fn new(token_secret: SecretKey) -> Self {
        Self {
            token_secret,
            previous_token_secret: None,
            token_ttl: Duration::seconds(Self::DEFAULT_TOKEN_TTL_SECS),
            password_pepper: None,
            route_policy: RoutePolicy::club_default(),
            max_login_failures: Self::DEFAULT_MAX_LOGIN_FAILURES,
            lockout: Duration::seconds(Self::DEFAULT_LOCKOUT_SECS),
        }
    }

    /// Create config with a random signing secret (for development).
    /// Tokens do not survive a restart.
    pub fn development() -> Self {
        Self::new(SecretKey::random())
    }

    pub fn with_previous_secret(mut self, previous: Option<SecretKey>) -> Self {
        self.previous_token_secret = previous;
        self
    }

    /// Clamped to `1..=MAX_TOKEN_TTL_SECS` seconds
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = clamp_secs(ttl, Self::MAX_TOKEN_TTL_SECS);
        self
    }

    pub fn with_pepper(mut self, pepper: Option<Vec<u8>>) -> Self {
        self.password_pepper = pepper;
        self
    }

    /// Both values are clamped: at least one failure and one second, at
    /// most `MAX_LOGIN_FAILURES_LIMIT` and `MAX_LOCKOUT_SECS`. A zero or
    /// negative lockout would leave `locked_until` in the past.
    pub fn with_lockout(mut self, max_login_failures: u16, lockout: Duration) -> Self {
        self.max_login_failures = max_login_failures.clamp(1, Self::MAX_LOGIN_FAILURES_LIMIT);
        self.lockout = clamp_secs(lockout, Self::MAX_LOCKOUT_SECS);
        self
    }

    pub fn with_route_policy(mut self, policy: RoutePolicy) -> Self {
        self.route_policy = policy;
        self
    }

    pub fn token_keys(&self) -> TokenKeys {
        TokenKeys::new(self.token_secret.clone(), self.previous_token_secret.clone())
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

fn clamp_secs(duration: Duration, max_secs: i64) -> Duration {
    Duration::seconds(duration.num_seconds().clamp(1, max_secs))
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &self.token_secret)
            .field("previous_token_secret", &self.previous_token_secret)
            .field("token_ttl", &self.token_ttl)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .field("route_policy", &self.route_policy)
            .field("max_login_failures", &self.max_login_failures)
            .field("lockout", &self.lockout)
            .finish()
    }
}
