//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod enablement_guard;
pub mod member_admin;
pub mod principal_resolver;
pub mod request_gate;
pub mod route_policy;
pub mod sign_in;
pub mod sign_up;
pub mod token_codec;

// Re-exports
pub use config::AuthConfig;
pub use enablement_guard::EnablementGuard;
pub use member_admin::MemberAdminUseCase;
pub use principal_resolver::PrincipalResolver;
pub use request_gate::{GateDecision, RequestGate};
pub use route_policy::{RoutePolicy, RouteRule};
pub use sign_in::{SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use token_codec::{Token, TokenCodec, TokenKeys};
