//! National ID Value Object
//!
//! The member's opaque unique identifier (the principal's `identifier`).
//! Distinct from the login identity.

use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

const MIN_LENGTH: usize = 5;
const MAX_LENGTH: usize = 20;

/// ASCII alphanumerics only, normalized to uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let value = raw.as_ref().trim().to_ascii_uppercase();

        if value.is_empty() {
            return Err(AppError::bad_request("National ID cannot be empty"));
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::bad_request(
                "National ID may only contain letters and digits",
            ));
        }
        let len = value.len();
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&len) {
            return Err(AppError::bad_request(format!(
                "National ID must be {}-{} characters (got {})",
                MIN_LENGTH, MAX_LENGTH, len
            )));
        }

        Ok(Self(value))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_id_normalized() {
        let id = NationalId::new(" x1234567l ").unwrap();
        assert_eq!(id.as_str(), "X1234567L");
    }

    #[test]
    fn test_national_id_rejects_bad_input() {
        assert!(NationalId::new("").is_err());
        assert!(NationalId::new("AB12").is_err());
        assert!(NationalId::new("A".repeat(21)).is_err());
        assert!(NationalId::new("1234-5678").is_err());
        assert!(NationalId::new("12345678Ñ").is_err());
    }
}
