//! services/api/src/jwt.rs
//!
//! Session-token generation and validation.
//!
//! Tokens are HS256-signed JWTs binding a user id to a 7-day validity
//! window. They are not persisted server-side; validity is purely a
//! function of the signature and the expiry timestamp, and logout is a
//! client-side deletion.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime in days.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: Uuid,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Generates an HS256 session token for the given user.
pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + TOKEN_VALIDITY_DAYS * 24 * 60 * 60,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates and decodes a session token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration automatically.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

    #[test]
    fn issue_and_validate_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, TEST_SECRET).expect("token generation should succeed");

        let claims = validate_token(&token, TEST_SECRET).expect("token validation should succeed");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, TOKEN_VALIDITY_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn expired_token_fails() {
        // Manually create an already-expired token.
        // Use a margin well beyond the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 600,
            exp: now - 300, // expired 5 minutes ago (well past leeway)
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("encoding should succeed");

        let result = validate_token(&token, TEST_SECRET);
        assert!(result.is_err(), "expired token must fail validation");
    }

    #[test]
    fn different_secrets_fail() {
        let token =
            issue_token(Uuid::new_v4(), "secret-alpha").expect("token generation should succeed");

        let result = validate_token(&token, "secret-bravo");
        assert!(
            result.is_err(),
            "token signed with a different secret must fail"
        );
    }
}
