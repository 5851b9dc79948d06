//! Auth Middleware
//!
//! Two layers wrap every route:
//! - `request_gate` authenticates the bearer token and installs the
//!   [`Principal`] into request extensions
//! - `enablement_guard` re-checks the enabled flag and removes the
//!   principal if the member has been disabled
//!
//! The gate must be the outer layer. See [`protect`](super::router::protect).

use axum::extract::{OriginalUri, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::{EnablementGuard, GateDecision, RequestGate};
use crate::domain::entity::principal::Principal;
use crate::domain::repository::UserDirectory;
use crate::presentation::handlers::AuthAppState;

/// Authenticate the request or short-circuit with the gate's error
pub async fn request_gate<R>(
    State(state): State<AuthAppState<R>>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request,
    next: Next,
) -> Response
where
    R: UserDirectory + Clone + Send + Sync + 'static,
{
    // nested routers see a stripped path; policy patterns are absolute
    let path = original_uri.path();

    let gate = RequestGate::new(
        state.repo.clone(),
        state.codec.clone(),
        state.policy.clone(),
    );

    let method = req.method().clone();
    let authorization = req.headers().get(header::AUTHORIZATION).cloned();
    let decision = gate.evaluate(&method, path, authorization.as_ref()).await;

    match decision {
        Ok(GateDecision::Bypassed) => {
            tracing::trace!(%method, path, "Public route");
            // a client-supplied principal can never ride along
            req.extensions_mut().remove::<Principal>();
            next.run(req).await
        }
        Ok(GateDecision::Authenticated(principal)) => {
            tracing::debug!(username_key = %principal.username_key(), path, "Request authenticated");
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Reject requests whose principal has been disabled since the token was issued
pub async fn enablement_guard<R>(
    State(state): State<AuthAppState<R>>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request,
    next: Next,
) -> Response
where
    R: UserDirectory + Clone + Send + Sync + 'static,
{
    if state.policy.is_public(req.method(), original_uri.path()) {
        return next.run(req).await;
    }

    let Some(principal) = req.extensions().get::<Principal>().cloned() else {
        // nothing to re-check; handlers needing a principal reject on their own
        return next.run(req).await;
    };

    let guard = EnablementGuard::new(state.repo.clone());
    if let Err(e) = guard.check(&principal).await {
        req.extensions_mut().remove::<Principal>();
        return e.into_response();
    }

    next.run(req).await
}
