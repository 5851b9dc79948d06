//! Signing key material
//!
//! [`SecretKey`] holds raw key bytes that must never be logged or
//! hardcoded. The bytes are zeroized on drop.

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto;

/// Minimum accepted key length in bytes (HMAC-SHA256 block output size)
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretKeyError {
    #[error("Secret key is not valid base64")]
    InvalidEncoding,

    #[error("Secret key must be at least {min} bytes (got {actual})")]
    TooShort { min: usize, actual: usize },
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> Result<Self, SecretKeyError> {
        if bytes.len() < MIN_SECRET_LEN {
            let actual = bytes.len();
            let mut bytes = bytes;
            bytes.zeroize();
            return Err(SecretKeyError::TooShort {
                min: MIN_SECRET_LEN,
                actual,
            });
        }
        Ok(Self(bytes))
    }

    /// Decode a standard base64 string (as stored in environment variables)
    pub fn from_base64(encoded: &str) -> Result<Self, SecretKeyError> {
        let bytes =
            crypto::from_base64(encoded.trim()).map_err(|_| SecretKeyError::InvalidEncoding)?;
        Self::new(bytes)
    }

    /// Fresh random key from the OS RNG
    pub fn random() -> Self {
        Self(crypto::random_bytes(MIN_SECRET_LEN * 2))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&"[REDACTED]").finish()
    }
}
