//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::principal::Principal;

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub national_id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Sign up response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub member_id: String,
    pub email: String,
}

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Sign in response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    /// Send back as `Authorization: Bearer <token>`
    pub token: String,
    pub token_type: &'static str,
    /// Unix seconds
    pub expires_at: i64,
    pub email: String,
    pub roles: Vec<&'static str>,
}

// ============================================================================
// Current principal
// ============================================================================

/// GET /api/auth/me response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub identifier: String,
    pub email: String,
    pub roles: Vec<&'static str>,
}

impl From<&Principal> for MeResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            identifier: principal.identifier().to_string(),
            email: principal.username_key().to_string(),
            roles: authorities(principal),
        }
    }
}

// ============================================================================
// Member administration
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

pub(crate) fn authorities(principal: &Principal) -> Vec<&'static str> {
    principal.roles().iter().map(|role| role.authority()).collect()
}
