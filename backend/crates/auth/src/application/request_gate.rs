//! Request Gate
//!
//! Per-request authentication decision:
//!
//! 1. allow-listed route: bypass, no principal
//! 2. no `Authorization: Bearer` header: `MissingToken`
//! 3. signature / structure check: `InvalidSignature` / `MalformedToken`
//! 4. expired: `TokenExpired`
//! 5. subject not in the directory: `PrincipalNotFound`
//! 6. subject/expiry re-validated against the resolved principal
//! 7. disabled principal: `AccountDisabled`
//!
//! Directory failures become `AuthenticationFailed`; the gate never
//! defaults to authenticated.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};

use crate::application::principal_resolver::PrincipalResolver;
use crate::application::route_policy::RoutePolicy;
use crate::application::token_codec::TokenCodec;
use crate::domain::entity::principal::Principal;
use crate::domain::repository::UserDirectory;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

const BEARER_SCHEME: &str = "bearer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Public route; proceed without a principal
    Bypassed,
    Authenticated(Principal),
}

pub struct RequestGate<D>
where
    D: UserDirectory,
{
    directory: Arc<D>,
    codec: TokenCodec,
    policy: Arc<RoutePolicy>,
}

impl<D> RequestGate<D>
where
    D: UserDirectory,
{
    pub fn new(directory: Arc<D>, codec: TokenCodec, policy: Arc<RoutePolicy>) -> Self {
        Self {
            directory,
            codec,
            policy,
        }
    }

    pub async fn evaluate(
        &self,
        method: &Method,
        path: &str,
        authorization: Option<&HeaderValue>,
    ) -> AuthResult<GateDecision> {
        if self.policy.is_public(method, path) {
            return Ok(GateDecision::Bypassed);
        }

        let raw_token = authorization
            .and_then(bearer_token)
            .ok_or(AuthError::MissingToken)?;

        let token = self.codec.parse(raw_token)?;
        if TokenCodec::is_expired(&token, self.codec.now()) {
            return Err(AuthError::TokenExpired);
        }

        // a subject that is not a valid email cannot name a member
        let username_key =
            Email::new(TokenCodec::subject_of(&token)).map_err(|_| AuthError::PrincipalNotFound)?;

        let member = self
            .directory
            .find_by_username_key(&username_key)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Directory lookup failed while gating request");
                AuthError::AuthenticationFailed
            })?
            .ok_or(AuthError::PrincipalNotFound)?;

        let principal = PrincipalResolver::resolve(&member);
        TokenCodec::validate(&token, &principal, self.codec.now())?;

        if !principal.is_enabled() {
            return Err(AuthError::AccountDisabled);
        }

        Ok(GateDecision::Authenticated(principal))
    }
}

/// Token from `Bearer <token>`; the scheme is case-insensitive
pub fn bearer_token(value: &HeaderValue) -> Option<&str> {
    let value = value.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
