//! Member Entity
//!
//! The stored club member record: identity, credentials, enablement,
//! role assignments and login-failure tracking.

use chrono::{DateTime, Duration, Utc};
use kernel::id::MemberId;

use crate::domain::value_object::{
    email::Email, national_id::NationalId, user_password::UserPassword, user_role::UserRole,
};

/// Highest failure count the `SMALLINT` column holds
pub const MAX_FAILED_LOGIN_COUNT: u16 = i16::MAX as u16;

/// Consecutive failed logins and the temporary lock they may have set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFailures {
    pub count: u16,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginFailures {
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Count one failure at `now`. Returns true if the account is locked
    /// afterwards.
    pub fn record(&mut self, now: DateTime<Utc>, max_failures: u16, lockout: Duration) -> bool {
        // an expired lock starts a fresh count
        if self.locked_until.is_some_and(|until| until <= now) {
            self.count = 0;
            self.locked_until = None;
        }

        self.count = self.count.saturating_add(1).min(MAX_FAILED_LOGIN_COUNT);
        self.last_failed_at = Some(now);

        if self.count >= max_failures {
            self.locked_until = Some(
                now.checked_add_signed(lockout)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            );
        }
        self.is_locked(now)
    }
}

/// One granted role. A member may hold several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub role: UserRole,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Member {
    pub member_id: MemberId,
    pub national_id: NationalId,
    /// Login identity
    pub email: Email,
    pub password_hash: UserPassword,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Administrative switch; disabled members cannot sign in or pass the gate
    pub enabled: bool,
    pub role_assignments: Vec<RoleAssignment>,
    pub login_failures: LoginFailures,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// New enabled member holding the `User` role
    pub fn new(
        national_id: NationalId,
        email: Email,
        password_hash: UserPassword,
        first_name: Option<String>,
        last_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            member_id: MemberId::new(),
            national_id,
            email,
            password_hash,
            first_name,
            last_name,
            enabled: true,
            role_assignments: vec![RoleAssignment {
                role: UserRole::User,
                assigned_at: now,
            }],
            login_failures: LoginFailures::default(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if account is locked at `now`
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.login_failures.is_locked(now)
    }

    /// Successful login: clear failure tracking
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.login_failures = LoginFailures::default();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Grant a role; no-op if already held
    pub fn assign_role(&mut self, role: UserRole, now: DateTime<Utc>) {
        if self.role_assignments.iter().any(|a| a.role == role) {
            return;
        }
        self.role_assignments.push(RoleAssignment {
            role,
            assigned_at: now,
        });
        self.updated_at = now;
    }

    pub fn set_enabled(&mut self, enabled: bool, now: DateTime<Utc>) {
        self.enabled = enabled;
        self.updated_at = now;
    }
}
