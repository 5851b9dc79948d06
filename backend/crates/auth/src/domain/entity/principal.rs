//! Principal
//!
//! The authenticated actor for one request. Built fresh from a [`Member`]
//! by the principal resolver and never mutated afterwards.
//!
//! [`Member`]: crate::domain::entity::member::Member

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::value_object::{
    email::Email, national_id::NationalId, user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    identifier: NationalId,
    username_key: Email,
    password_hash: UserPassword,
    roles: BTreeSet<UserRole>,
    enabled: bool,
}

impl Principal {
    pub(crate) fn new(
        identifier: NationalId,
        username_key: Email,
        password_hash: UserPassword,
        roles: BTreeSet<UserRole>,
        enabled: bool,
    ) -> Self {
        Self {
            identifier,
            username_key,
            password_hash,
            roles,
            enabled,
        }
    }

    pub fn identifier(&self) -> &NationalId {
        &self.identifier
    }

    /// Login identity; tokens carry this as their subject
    pub fn username_key(&self) -> &Email {
        &self.username_key
    }

    pub fn password_hash(&self) -> &UserPassword {
        &self.password_hash
    }

    /// Possibly empty, never duplicated
    pub fn roles(&self) -> &BTreeSet<UserRole> {
        &self.roles
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn require_any_role(&self, allowed: &[UserRole]) -> AuthResult<()> {
        if allowed.iter().any(|role| self.has_role(*role)) {
            Ok(())
        } else {
            tracing::warn!(
                username_key = %self.username_key,
                required = ?allowed,
                "Role check failed"
            );
            Err(AuthError::InsufficientRole)
        }
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("identifier", &self.identifier)
            .field("username_key", &self.username_key)
            .field("password_hash", &"[REDACTED]")
            .field("roles", &self.roles)
            .field("enabled", &self.enabled)
            .finish()
    }
}
