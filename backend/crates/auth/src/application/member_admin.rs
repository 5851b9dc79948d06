//! Member Administration Use Case
//!
//! Enabling and disabling members. Admin-only; the enablement guard makes
//! a disable effective on the member's very next request.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entity::principal::Principal;
use crate::domain::repository::MemberRepository;
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

pub struct MemberAdminUseCase<R>
where
    R: MemberRepository,
{
    repo: Arc<R>,
}

impl<R> MemberAdminUseCase<R>
where
    R: MemberRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn set_enabled(
        &self,
        actor: &Principal,
        target: &str,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> AuthResult<()> {
        actor.require_any_role(&[UserRole::Admin])?;

        let email = Email::new(target)?;
        if !self.repo.set_enabled(&email, enabled, now).await? {
            return Err(AuthError::MemberNotFound);
        }

        tracing::info!(
            actor = %actor.username_key(),
            target = %email,
            enabled,
            "Member enablement changed"
        );
        Ok(())
    }
}
