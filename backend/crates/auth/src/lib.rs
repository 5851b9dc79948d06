//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Members, principals, repository traits
//! - `application/` - Token codec, request gate, enablement guard, use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Member sign-up with national id + email + password
//! - Email + password sign-in issuing a signed, self-contained bearer token
//! - Per-request authentication against a public-route allow-list
//! - Disabled members lose access on their next request
//! - Role-based access (User, Moderator, Admin)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Tokens signed with HMAC-SHA256; the signing secret comes from configuration
//! - Signature verified before any token content is trusted
//! - Temporary lockout after repeated failed sign-ins

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::entity::principal::Principal;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgMemberRepository;
pub use presentation::{AuthAppState, CurrentPrincipal, auth_router, protect};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
