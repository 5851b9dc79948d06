//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, extractor and middleware.

pub mod dto;
pub mod extractor;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extractor::CurrentPrincipal;
pub use handlers::AuthAppState;
pub use middleware::{enablement_guard, request_gate};
pub use router::{auth_router, protect};
