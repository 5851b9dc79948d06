//! Enablement Guard
//!
//! Second check after the gate: re-reads the enabled flag from the
//! directory so a member disabled mid-session loses access on the next
//! request, whatever their token says.

use std::sync::Arc;

use crate::domain::entity::principal::Principal;
use crate::domain::repository::UserDirectory;
use crate::error::{AuthError, AuthResult};

pub struct EnablementGuard<D>
where
    D: UserDirectory,
{
    directory: Arc<D>,
}

impl<D> EnablementGuard<D>
where
    D: UserDirectory,
{
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// A vanished member or a failed lookup counts as disabled.
    pub async fn check(&self, principal: &Principal) -> AuthResult<()> {
        match self.directory.is_enabled(principal.username_key()).await {
            Ok(Some(true)) => Ok(()),
            Ok(Some(false)) => {
                tracing::info!(
                    username_key = %principal.username_key(),
                    "Rejected request from disabled member"
                );
                Err(AuthError::AccountDisabled)
            }
            Ok(None) => {
                tracing::info!(
                    username_key = %principal.username_key(),
                    "Member vanished during session"
                );
                Err(AuthError::AccountDisabled)
            }
            Err(e) => {
                tracing::error!(error = %e, "Enabled-flag lookup failed");
                Err(AuthError::AccountDisabled)
            }
        }
    }
}
