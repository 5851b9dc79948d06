//! Principal Resolver
//!
//! Maps a stored member record to the per-request [`Principal`].

use std::collections::BTreeSet;

use crate::domain::entity::{member::Member, principal::Principal};

pub struct PrincipalResolver;

impl PrincipalResolver {
    /// Pure mapping; role assignments flatten into a deduplicated set.
    pub fn resolve(member: &Member) -> Principal {
        let roles: BTreeSet<_> = member
            .role_assignments
            .iter()
            .map(|assignment| assignment.role)
            .collect();

        Principal::new(
            member.national_id.clone(),
            member.email.clone(),
            member.password_hash.clone(),
            roles,
            member.enabled,
        )
    }
}
