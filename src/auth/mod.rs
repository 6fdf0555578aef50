pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Claims carried by every access token.
///
/// The admin flag defaults to false when the claim is absent, so a token
/// without it is honored as a regular user rather than rejected. There is no
/// revocation list: a role change after issuance is honored until expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Admin role flag
    #[serde(default)]
    pub admin: bool,
    /// Expiration timestamp (seconds since epoch)
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token generation failed: {0}")]
    Generation(String),

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Issues and validates signed access tokens. Built once from the signing
/// secret at startup and shared through application state.
#[derive(Clone)]
pub struct Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_mins: i64,
}

impl Tokens {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret_key.as_bytes()),
            expiry_mins: config.token_expiry_mins,
        }
    }

    /// Issue an HS256 token for the given subject, expiring after the
    /// configured TTL.
    pub fn issue(&self, username: &str, is_admin: bool) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            admin: is_admin,
            exp: (now + Duration::minutes(self.expiry_mins)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature and expiry, with zero leeway: a token one second past
    /// its expiry instant is rejected. Malformed encoding, a bad signature,
    /// or a missing subject claim all come back as `Invalid`.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tokens() -> Tokens {
        Tokens::new(&SecurityConfig {
            secret_key: "test-secret".to_string(),
            token_expiry_mins: 30,
        })
    }

    /// Encode an arbitrary claim set with the test secret.
    fn encode_raw(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_round_trips() {
        let tokens = tokens();
        let token = tokens.issue("alice", true).unwrap();
        let claims = tokens.validate(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.admin);
    }

    #[test]
    fn token_is_rejected_after_expiry() {
        let tokens = tokens();
        let now = Utc::now().timestamp();

        // Expired one second ago: zero leeway means this must fail
        let expired = encode_raw(json!({
            "sub": "alice", "admin": false, "exp": now - 1, "iat": now - 1800
        }));
        assert!(tokens.validate(&expired).is_err());

        // Still a few seconds from expiry: accepted
        let live = encode_raw(json!({
            "sub": "alice", "admin": false, "exp": now + 5, "iat": now
        }));
        assert!(tokens.validate(&live).is_ok());
    }

    #[test]
    fn tampered_or_garbage_tokens_are_invalid() {
        let tokens = tokens();
        let mut token = tokens.issue("alice", false).unwrap();
        token.push('x');
        assert!(tokens.validate(&token).is_err());
        assert!(tokens.validate("not-a-jwt").is_err());
        assert!(tokens.validate("").is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = Tokens::new(&SecurityConfig {
            secret_key: "other-secret".to_string(),
            token_expiry_mins: 30,
        });
        let token = other.issue("alice", false).unwrap();
        assert!(tokens().validate(&token).is_err());
    }

    #[test]
    fn missing_admin_claim_defaults_to_non_admin() {
        let tokens = tokens();
        let now = Utc::now().timestamp();
        let token = encode_raw(json!({
            "sub": "alice", "exp": now + 60, "iat": now
        }));
        let claims = tokens.validate(&token).unwrap();
        assert!(!claims.admin);
    }

    #[test]
    fn missing_subject_claim_is_invalid() {
        let tokens = tokens();
        let now = Utc::now().timestamp();
        let token = encode_raw(json!({
            "admin": true, "exp": now + 60, "iat": now
        }));
        assert!(tokens.validate(&token).is_err());
    }
}
