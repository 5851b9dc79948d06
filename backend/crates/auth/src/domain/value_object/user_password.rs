//! Member passwords
//!
//! [`RawPassword`] is what the client sent; [`UserPassword`] is the stored
//! argon2id hash. Policy failures surface as 400s with a hint for the form.

use std::fmt;

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};

/// Submitted password, wiped on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Sign-up: normalize and enforce the password policy
    pub fn new(raw: String) -> AppResult<Self> {
        ClearTextPassword::new(raw).map(Self).map_err(|e| {
            let hint = match e {
                PasswordPolicyError::TooShort { .. } => "Choose a longer password",
                PasswordPolicyError::TooLong { .. } => "Choose a shorter password",
                PasswordPolicyError::EmptyOrWhitespace => "Enter a password",
                PasswordPolicyError::InvalidCharacter => "Remove control characters",
                PasswordPolicyError::CommonPattern => "Choose a less predictable password",
            };
            AppError::bad_request(e.to_string()).with_action(hint)
        })
    }

    /// Sign-in: normalize only
    pub fn for_verification(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawPassword([REDACTED])")
    }
}

/// Stored password hash (PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        raw.0
            .hash(pepper)
            .map(Self)
            .map_err(|e| AppError::internal(e.to_string()))
    }

    /// Load from `members.password_hash`
    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AppError::internal("Invalid password hash in database"))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(&raw.0, pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserPassword([HASH])")
    }
}
