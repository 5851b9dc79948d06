//! Token Codec
//!
//! Stateless, signed, expiring bearer tokens. The wire shape is that of a
//! JWT signed with HS256:
//!
//! ```text
//! base64url(header) "." base64url(payload) "." base64url(HMAC-SHA256(key, header "." payload))
//! ```
//!
//! The payload carries `sub`, `iat` and `exp` (unix seconds) next to the
//! free-form claims. Nothing in the header or payload is decoded until
//! the signature has verified.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kernel::clock::Clock;
use platform::crypto;
use platform::secret::SecretKey;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::application::config::AuthConfig;
use crate::domain::entity::principal::Principal;
use crate::error::{AuthError, AuthResult};

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
const ALGORITHM: &str = "HS256";

/// Payload keys owned by the codec; callers cannot override them
const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Active signing keys.
///
/// `current` signs and verifies. `previous` only verifies, so tokens signed
/// before a rotation stay valid until they expire.
#[derive(Debug, Clone)]
pub struct TokenKeys {
    current: SecretKey,
    previous: Option<SecretKey>,
}

impl TokenKeys {
    pub fn new(current: SecretKey, previous: Option<SecretKey>) -> Self {
        Self { current, previous }
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool {
        crypto::hmac_sha256_verify(self.current.expose(), signing_input, signature)
            || self.previous.as_ref().is_some_and(|key| {
                crypto::hmac_sha256_verify(key.expose(), signing_input, signature)
            })
    }
}

/// A decoded, signature-checked token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    subject: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    claims: Map<String, Value>,
    signature: Vec<u8>,
    encoded: String,
}

impl Token {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Wire form, as sent in `Authorization: Bearer ...`
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn into_string(self) -> String {
        self.encoded
    }
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

#[derive(Deserialize)]
struct Payload {
    sub: String,
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    claims: Map<String, Value>,
}

#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<TokenKeys>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// `ttl` is truncated to whole seconds and clamped to
    /// `1..=AuthConfig::MAX_TOKEN_TTL_SECS`, so `expires_at > issued_at`
    /// always holds and `issue` stays inside chrono's date range.
    pub fn new(keys: TokenKeys, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = Duration::seconds(
            ttl.num_seconds()
                .clamp(1, AuthConfig::MAX_TOKEN_TTL_SECS),
        );
        Self {
            keys: Arc::new(keys),
            ttl,
            clock,
        }
    }

    pub fn from_config(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.token_keys(), config.token_ttl, clock)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Issue a token for `subject`, valid from now for the configured TTL.
    pub fn issue(&self, subject: &str, claims: Map<String, Value>) -> Token {
        let now = self.clock.now();
        // wire timestamps are whole seconds
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut claims = claims;
        for key in RESERVED_CLAIMS {
            claims.remove(key);
        }

        let mut payload = claims.clone();
        payload.insert("sub".to_string(), Value::from(subject));
        payload.insert("iat".to_string(), Value::from(issued_at.timestamp()));
        payload.insert("exp".to_string(), Value::from(expires_at.timestamp()));

        let signing_input = format!(
            "{}.{}",
            crypto::to_base64url(HEADER_JSON.as_bytes()),
            crypto::to_base64url(Value::Object(payload).to_string().as_bytes()),
        );
        let signature = crypto::hmac_sha256(self.keys.current.expose(), signing_input.as_bytes());
        let encoded = format!("{}.{}", signing_input, crypto::to_base64url(&signature));

        Token {
            subject: subject.to_string(),
            issued_at,
            expires_at,
            claims,
            signature: signature.to_vec(),
            encoded,
        }
    }

    /// Verify and decode. Expiry is not checked here.
    pub fn parse(&self, text: &str) -> AuthResult<Token> {
        let text = text.trim();

        // splitn keeps any extra '.' inside the signature segment, where it
        // fails decoding as a bad signature
        let mut segments = text.splitn(3, '.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(AuthError::MalformedToken);
        };
        if header_b64.is_empty() || payload_b64.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        let signature =
            crypto::from_base64url(signature_b64).map_err(|_| AuthError::InvalidSignature)?;
        let signing_input_len = header_b64.len() + 1 + payload_b64.len();
        let signing_input = &text.as_bytes()[..signing_input_len];
        if !self.keys.verify(signing_input, &signature) {
            return Err(AuthError::InvalidSignature);
        }

        // signature verified; fields may now be trusted
        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::MalformedToken);
        }

        let payload: Payload = decode_segment(payload_b64)?;
        let issued_at = DateTime::from_timestamp(payload.iat, 0).ok_or(AuthError::MalformedToken)?;
        let expires_at = DateTime::from_timestamp(payload.exp, 0).ok_or(AuthError::MalformedToken)?;
        if expires_at <= issued_at {
            return Err(AuthError::MalformedToken);
        }

        Ok(Token {
            subject: payload.sub,
            issued_at,
            expires_at,
            claims: payload.claims,
            signature,
            encoded: text.to_string(),
        })
    }

    pub fn is_expired(token: &Token, now: DateTime<Utc>) -> bool {
        now >= token.expires_at
    }

    pub fn subject_of(token: &Token) -> &str {
        &token.subject
    }

    /// Authoritative check: the token belongs to `principal` and is live at `now`.
    pub fn validate(token: &Token, principal: &Principal, now: DateTime<Utc>) -> AuthResult<()> {
        if token.subject != principal.username_key().as_str() {
            return Err(AuthError::SubjectMismatch);
        }
        if Self::is_expired(token, now) {
            return Err(AuthError::TokenExpired);
        }
        Ok(())
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> AuthResult<T> {
    let bytes = crypto::from_base64url(segment).map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::clock::ManualClock;
    use serde_json::json;

    fn key(byte: u8) -> SecretKey {
        SecretKey::new(vec![byte; 32]).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_717_200_000, 0).unwrap()
    }

    fn codec_with(keys: TokenKeys) -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let codec = TokenCodec::new(keys, Duration::hours(10), clock.clone());
        (codec, clock)
    }

    fn codec() -> (TokenCodec, Arc<ManualClock>) {
        codec_with(TokenKeys::new(key(1), None))
    }

    /// Sign an arbitrary header/payload pair with `key`
    fn forge(key: &SecretKey, header: &[u8], payload: &[u8]) -> String {
        let input = format!(
            "{}.{}",
            crypto::to_base64url(header),
            crypto::to_base64url(payload)
        );
        let sig = crypto::hmac_sha256(key.expose(), input.as_bytes());
        format!("{}.{}", input, crypto::to_base64url(&sig))
    }

    #[test]
    fn test_issue_stamps_times() {
        let (codec, _) = codec();
        let token = codec.issue("alice@example.com", Map::new());
        assert_eq!(token.issued_at(), t0());
        assert_eq!(token.expires_at(), t0() + Duration::hours(10));
        assert_eq!(token.as_str().split('.').count(), 3);
    }

    #[test]
    fn test_issue_is_deterministic() {
        let (codec, _) = codec();
        let a = codec.issue("alice@example.com", Map::new());
        let b = codec.issue("alice@example.com", Map::new());
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_roundtrip_preserves_subject_and_claims() {
        let (codec, _) = codec();
        let mut claims = Map::new();
        claims.insert("club".to_string(), json!("Rey Ardid"));
        claims.insert("board".to_string(), json!(3));

        let issued = codec.issue("alice@example.com", claims.clone());
        let parsed = codec.parse(issued.as_str()).unwrap();

        assert_eq!(TokenCodec::subject_of(&parsed), "alice@example.com");
        assert_eq!(parsed.claims(), &claims);
        assert_eq!(parsed, issued);
    }

    #[test]
    fn test_reserved_claims_are_dropped() {
        let (codec, _) = codec();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!("mallory@example.com"));
        claims.insert("exp".to_string(), json!(i64::MAX));

        let token = codec.issue("alice@example.com", claims);
        let parsed = codec.parse(token.as_str()).unwrap();
        assert_eq!(parsed.subject(), "alice@example.com");
        assert_eq!(parsed.expires_at(), t0() + Duration::hours(10));
        assert!(parsed.claims().is_empty());
    }

    #[test]
    fn test_expiry_boundary() {
        let (codec, _) = codec();
        let token = codec.issue("alice@example.com", Map::new());
        let exp = token.expires_at();

        assert!(!TokenCodec::is_expired(&token, t0()));
        assert!(!TokenCodec::is_expired(&token, exp - Duration::seconds(1)));
        assert!(TokenCodec::is_expired(&token, exp));
        assert!(TokenCodec::is_expired(&token, exp + Duration::seconds(1)));
    }

    #[test]
    fn test_structural_damage_is_malformed() {
        let (codec, _) = codec();
        assert!(matches!(codec.parse(""), Err(AuthError::MalformedToken)));
        assert!(matches!(codec.parse("abc"), Err(AuthError::MalformedToken)));
        assert!(matches!(codec.parse("abc.def"), Err(AuthError::MalformedToken)));
        assert!(matches!(codec.parse(".def.ghi"), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_signed_garbage_is_malformed() {
        let (codec, _) = codec();
        let k = key(1);

        let token = forge(&k, b"not json", br#"{"sub":"a","iat":1,"exp":2}"#);
        assert!(matches!(codec.parse(&token), Err(AuthError::MalformedToken)));

        let token = forge(&k, br#"{"alg":"none"}"#, br#"{"sub":"a","iat":1,"exp":2}"#);
        assert!(matches!(codec.parse(&token), Err(AuthError::MalformedToken)));

        let token = forge(&k, HEADER_JSON.as_bytes(), br#"{"iat":1,"exp":2}"#);
        assert!(matches!(codec.parse(&token), Err(AuthError::MalformedToken)));

        // expiry not after issue
        let token = forge(&k, HEADER_JSON.as_bytes(), br#"{"sub":"a","iat":5,"exp":5}"#);
        assert!(matches!(codec.parse(&token), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_unsigned_garbage_is_invalid_signature() {
        // well-formed segments but signed with a different key: nothing decoded
        let (codec, _) = codec();
        let token = forge(&key(9), b"not json", b"not json either");
        assert!(matches!(codec.parse(&token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let (codec, _) = codec();
        let token = codec.issue("alice@example.com", Map::new());
        let parts: Vec<&str> = token.as_str().split('.').collect();
        let forged_payload = crypto::to_base64url(
            format!(
                r#"{{"sub":"admin@example.com","iat":{},"exp":{}}}"#,
                t0().timestamp(),
                (t0() + Duration::hours(10)).timestamp()
            )
            .as_bytes(),
        );
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert!(matches!(codec.parse(&tampered), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_extra_segment_is_invalid_signature() {
        let (codec, _) = codec();
        let token = codec.issue("alice@example.com", Map::new());
        let extended = format!("{}.xyz", token.as_str());
        assert!(matches!(codec.parse(&extended), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_key_rotation() {
        let (old_codec, _) = codec_with(TokenKeys::new(key(1), None));
        let token = old_codec.issue("alice@example.com", Map::new());

        let (rotated, _) = codec_with(TokenKeys::new(key(2), Some(key(1))));
        assert!(rotated.parse(token.as_str()).is_ok());

        let (retired, _) = codec_with(TokenKeys::new(key(2), None));
        assert!(matches!(retired.parse(token.as_str()), Err(AuthError::InvalidSignature)));

        // new tokens are signed with the current key only
        let fresh = rotated.issue("alice@example.com", Map::new());
        let (previous_only, _) = codec_with(TokenKeys::new(key(1), None));
        assert!(matches!(
            previous_only.parse(fresh.as_str()),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_minimum_ttl() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(t0()));
        let codec = TokenCodec::new(TokenKeys::new(key(1), None), Duration::zero(), clock);
        let token = codec.issue("alice@example.com", Map::new());
        assert!(token.expires_at() > token.issued_at());
    }

    #[test]
    fn test_oversized_ttl_is_clamped() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(t0()));
        let codec = TokenCodec::new(
            TokenKeys::new(key(1), None),
            Duration::seconds(8_640_000_000_000),
            clock,
        );
        assert_eq!(codec.ttl(), Duration::seconds(AuthConfig::MAX_TOKEN_TTL_SECS));

        let token = codec.issue("alice@example.com", Map::new());
        assert_eq!(
            token.expires_at(),
            t0() + Duration::seconds(AuthConfig::MAX_TOKEN_TTL_SECS)
        );
        let parsed = codec.parse(token.as_str()).unwrap();
        assert_eq!(parsed.expires_at(), token.expires_at());
    }

    #[test]
    fn test_issue_near_end_of_time_saturates() {
        let end = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(end));
        let codec = TokenCodec::new(TokenKeys::new(key(1), None), Duration::hours(10), clock);
        let token = codec.issue("alice@example.com", Map::new());
        assert!(token.expires_at() > token.issued_at());
    }
}
