//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::domain::repository::{MemberRepository, UserDirectory};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{enablement_guard, request_gate};

/// Routes served under `/api/auth`
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: UserDirectory + MemberRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/signup", post(handlers::sign_up::<R>))
        .route("/signin", post(handlers::sign_in::<R>))
        .route("/me", get(handlers::me))
        .route(
            "/members/{email}/enabled",
            put(handlers::set_member_enabled::<R>),
        )
        .with_state(state)
}

/// Wrap an application router with the request gate and enablement guard.
///
/// Apply once at the top level, after all routers are nested, so every
/// route is gated and the policy sees absolute paths.
pub fn protect<R>(router: Router, state: AuthAppState<R>) -> Router
where
    R: UserDirectory + Clone + Send + Sync + 'static,
{
    // last layer added runs first: gate, then guard
    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            enablement_guard::<R>,
        ))
        .layer(middleware::from_fn_with_state(state, request_gate::<R>))
}
