//! Sign Up Use Case
//!
//! Registers a new club member with the `User` role.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::MemberId;

use crate::application::config::AuthConfig;
use crate::domain::entity::member::Member;
use crate::domain::repository::MemberRepository;
use crate::domain::value_object::{
    email::Email,
    national_id::NationalId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

const NAME_MAX_CHARS: usize = 100;

/// Sign up input
pub struct SignUpInput {
    pub national_id: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub member_id: MemberId,
    pub email: Email,
}

/// Sign up use case
pub struct SignUpUseCase<R>
where
    R: MemberRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> SignUpUseCase<R>
where
    R: MemberRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        input: SignUpInput,
        now: DateTime<Utc>,
    ) -> AuthResult<SignUpOutput> {
        let national_id = NationalId::new(&input.national_id)?;
        let email = Email::new(&input.email)?;
        let first_name = normalize_name("First name", input.first_name)?;
        let last_name = normalize_name("Last name", input.last_name)?;

        let raw_password = RawPassword::new(input.password)
            .map_err(|e| AuthError::PasswordValidation(e.message().to_string()))?;

        if self.repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.repo.exists_by_national_id(&national_id).await? {
            return Err(AuthError::NationalIdTaken);
        }

        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let member = Member::new(national_id, email, password_hash, first_name, last_name, now);

        self.repo.create(&member).await?;

        tracing::info!(member_id = %member.member_id, "Member signed up");

        Ok(SignUpOutput {
            member_id: member.member_id,
            email: member.email,
        })
    }
}

/// Trimmed, blank becomes `None`
fn normalize_name(field: &str, name: Option<String>) -> AuthResult<Option<String>> {
    let Some(name) = name else {
        return Ok(None);
    };
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(AuthError::Validation(format!(
            "{} must be at most {} characters",
            field, NAME_MAX_CHARS
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(AuthError::Validation(format!(
            "{} contains invalid characters",
            field
        )));
    }
    Ok(Some(name.to_string()))
}
