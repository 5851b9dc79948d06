//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use kernel::clock::Clock;

use crate::application::config::AuthConfig;
use crate::application::{
    MemberAdminUseCase, RoutePolicy, SignInUseCase, SignUpInput, SignUpUseCase, TokenCodec,
};
use crate::domain::repository::{MemberRepository, UserDirectory};
use crate::error::AuthResult;
use crate::presentation::dto::{
    MeResponse, SetEnabledRequest, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
    authorities,
};
use crate::presentation::extractor::CurrentPrincipal;

/// Shared state for auth handlers and middleware
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub codec: TokenCodec,
    pub policy: Arc<RoutePolicy>,
}

impl<R> AuthAppState<R>
where
    R: Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let codec = TokenCodec::from_config(&config, clock);
        let policy = Arc::new(config.route_policy.clone());
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            codec,
            policy,
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserDirectory + MemberRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let input = SignUpInput {
        national_id: req.national_id,
        email: req.email,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
    };

    let output = use_case.execute(input, state.codec.now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            member_id: output.member_id.to_string(),
            email: output.email.to_string(),
        }),
    ))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Json<SignInResponse>>
where
    R: UserDirectory + MemberRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let output = use_case.authenticate(&req.email, req.password).await?;

    Ok(Json(SignInResponse {
        expires_at: output.token.expires_at().timestamp(),
        token: output.token.into_string(),
        token_type: "Bearer",
        email: output.principal.username_key().to_string(),
        roles: authorities(&output.principal),
    }))
}

// ============================================================================
// Current Principal
// ============================================================================

/// GET /api/auth/me
pub async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<MeResponse> {
    Json(MeResponse::from(&principal))
}

// ============================================================================
// Member Administration
// ============================================================================

/// PUT /api/auth/members/{email}/enabled
pub async fn set_member_enabled<R>(
    State(state): State<AuthAppState<R>>,
    CurrentPrincipal(actor): CurrentPrincipal,
    Path(email): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> AuthResult<StatusCode>
where
    R: UserDirectory + MemberRepository + Clone + Send + Sync + 'static,
{
    let use_case = MemberAdminUseCase::new(state.repo.clone());
    use_case
        .set_enabled(&actor, &email, req.enabled, state.codec.now())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
