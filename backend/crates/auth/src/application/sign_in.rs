//! Sign In Use Case
//!
//! Verifies email + password and issues a bearer token.
//!
//! Failure categories stay distinct because the HTTP layer renders them
//! differently: unknown member or wrong password (401), disabled (403),
//! locked (423).

use std::fmt;
use std::sync::Arc;

use serde_json::Map;

use crate::application::config::AuthConfig;
use crate::application::principal_resolver::PrincipalResolver;
use crate::application::token_codec::{Token, TokenCodec};
use crate::domain::entity::principal::Principal;
use crate::domain::repository::{MemberRepository, UserDirectory};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in output
pub struct SignInOutput {
    pub token: Token,
    pub principal: Principal,
}

// The encoded token is a bearer credential; keep it out of logs
impl fmt::Debug for SignInOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInOutput")
            .field("subject", &self.token.subject())
            .field("expires_at", &self.token.expires_at())
            .field("principal", &self.principal)
            .finish()
    }
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: UserDirectory + MemberRepository,
{
    repo: Arc<R>,
    codec: TokenCodec,
    config: Arc<AuthConfig>,
}

impl<R> SignInUseCase<R>
where
    R: UserDirectory + MemberRepository,
{
    pub fn new(repo: Arc<R>, codec: TokenCodec, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            codec,
            config,
        }
    }

    pub async fn authenticate(
        &self,
        username_key: &str,
        raw_password: String,
    ) -> AuthResult<SignInOutput> {
        let password = RawPassword::for_verification(raw_password);

        // Unparsable identity is indistinguishable from an unknown one
        let email = Email::new(username_key).map_err(|_| AuthError::InvalidCredentials)?;

        let member = self
            .repo
            .find_by_username_key(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !member.enabled {
            return Err(AuthError::AccountDisabled);
        }

        let now = self.codec.now();
        if member.is_locked(now) {
            return Err(AuthError::AccountLocked);
        }

        if !self.repo.check_password(&email, &password).await? {
            // decided on the stored row, not on the snapshot read above
            let failures = self
                .repo
                .record_login_failure(
                    &email,
                    now,
                    self.config.max_login_failures,
                    self.config.lockout,
                )
                .await?;
            if let Some(failures) = failures.filter(|f| f.is_locked(now)) {
                tracing::warn!(
                    member_id = %member.member_id,
                    failures = failures.count,
                    "Account locked after repeated login failures"
                );
            }
            return Err(AuthError::InvalidCredentials);
        }

        self.repo.record_login(&email, now).await?;

        let principal = PrincipalResolver::resolve(&member);
        let token = self
            .codec
            .issue(principal.username_key().as_str(), Map::new());

        tracing::info!(
            member_id = %member.member_id,
            expires_at = %token.expires_at(),
            "Member signed in"
        );

        Ok(SignInOutput { token, principal })
    }
}
