//! Principal Extractor
//!
//! Handlers take [`CurrentPrincipal`] to read the principal the request
//! gate installed. On a route the gate does not cover there is none, and
//! the extractor rejects with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::entity::principal::Principal;
use crate::error::AuthError;

pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or(AuthError::MissingToken)
    }
}
