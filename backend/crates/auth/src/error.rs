//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Token-path failures stay distinct here (and in logs) but render to
//! clients as one indistinguishable 401.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Client-facing message shared by every 401 on the token path
const UNAUTHENTICATED_MESSAGE: &str = "Authentication required";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    // ------------------------------------------------------------------
    // Request gating (401)
    // ------------------------------------------------------------------
    /// No `Authorization: Bearer` header on a gated route
    #[error("Missing bearer token")]
    MissingToken,

    /// Token is not three segments, or header/payload do not decode
    #[error("Malformed token")]
    MalformedToken,

    /// Signature segment does not verify under any active key
    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    /// Token subject no longer resolves to a member
    #[error("Principal not found")]
    PrincipalNotFound,

    #[error("Token subject does not match principal")]
    SubjectMismatch,

    /// Directory failure while gating; the gate fails closed
    #[error("Authentication failed")]
    AuthenticationFailed,

    // ------------------------------------------------------------------
    // Sign-in / authorization
    // ------------------------------------------------------------------
    /// Wrong password or unknown login identity
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    /// Account is locked (too many failed attempts)
    #[error("Account is temporarily locked")]
    AccountLocked,

    #[error("Insufficient role")]
    InsufficientRole,

    // ------------------------------------------------------------------
    // Member management
    // ------------------------------------------------------------------
    #[error("Member not found")]
    MemberNotFound,

    #[error("Email already registered")]
    EmailTaken,

    #[error("National ID already registered")]
    NationalIdTaken,

    /// Input validation error
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::PrincipalNotFound
            | AuthError::SubjectMismatch
            | AuthError::AuthenticationFailed
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled | AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::AccountLocked => StatusCode::LOCKED,
            AuthError::MemberNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailTaken | AuthError::NationalIdTaken => StatusCode::CONFLICT,
            AuthError::Validation(_) | AuthError::PasswordValidation(_) => {
                StatusCode::BAD_REQUEST
            }
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingToken
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::PrincipalNotFound
            | AuthError::SubjectMismatch
            | AuthError::AuthenticationFailed
            | AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::AccountDisabled | AuthError::InsufficientRole => ErrorKind::Forbidden,
            AuthError::AccountLocked => ErrorKind::Locked,
            AuthError::MemberNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::NationalIdTaken => ErrorKind::Conflict,
            AuthError::Validation(_) | AuthError::PasswordValidation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// True for failures produced while gating a bearer token
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::MalformedToken
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::PrincipalNotFound
                | AuthError::SubjectMismatch
                | AuthError::AuthenticationFailed
        )
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> String {
        match self {
            e if e.is_token_rejection() => UNAUTHENTICATED_MESSAGE.to_string(),
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::Database(_) | AuthError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.public_message());
        match self {
            e if e.is_token_rejection() => err.with_action("Sign in again"),
            AuthError::AccountLocked => err.with_action("Try again later"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::InvalidSignature | AuthError::SubjectMismatch => {
                tracing::warn!(error = %self, "Rejected bearer token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let mut response = self.to_app_error().into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Value objects validate into `AppError`; bad input stays a 400
impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                AuthError::Validation(err.message().to_string())
            }
            _ => AuthError::Internal(err.to_string()),
        }
    }
}
