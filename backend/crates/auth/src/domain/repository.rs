//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Duration, Utc};

use crate::domain::entity::member::{LoginFailures, Member};
use crate::domain::value_object::{
    email::Email, national_id::NationalId, user_password::RawPassword,
};
use crate::error::AuthResult;

/// Member lookups consumed by the request pipeline and sign-in.
///
/// Implementations hold no cross-request locks and do not retry.
#[trait_variant::make(UserDirectory: Send)]
pub trait LocalUserDirectory {
    /// Full member record (with role assignments) by login identity
    async fn find_by_username_key(&self, username_key: &Email) -> AuthResult<Option<Member>>;

    /// Current enabled flag; `None` if the member no longer exists
    async fn is_enabled(&self, username_key: &Email) -> AuthResult<Option<bool>>;

    /// Compare a submitted password with the stored hash. Unknown members
    /// yield `false`.
    async fn check_password(&self, username_key: &Email, password: &RawPassword)
    -> AuthResult<bool>;
}

/// Member writes
#[trait_variant::make(MemberRepository: Send)]
pub trait LocalMemberRepository {
    /// Insert member and role assignments
    async fn create(&self, member: &Member) -> AuthResult<()>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn exists_by_national_id(&self, national_id: &NationalId) -> AuthResult<bool>;

    /// Count one failed login against the stored record and return the
    /// resulting state; `None` if no member has this email.
    ///
    /// Read and write happen under one row lock, so concurrent failures
    /// are never lost.
    async fn record_login_failure(
        &self,
        email: &Email,
        now: DateTime<Utc>,
        max_failures: u16,
        lockout: Duration,
    ) -> AuthResult<Option<LoginFailures>>;

    /// Clear failure tracking and stamp the last login
    async fn record_login(&self, email: &Email, now: DateTime<Utc>) -> AuthResult<()>;

    /// Returns false if no member has this email
    async fn set_enabled(
        &self,
        email: &Email,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> AuthResult<bool>;
}
