//! JWT access-token validation.
//!
//! Tokens are HS256-signed JWTs issued by the external identity service;
//! this API only validates them and reads the embedded [`Claims`]. Token
//! issuance, refresh and revocation live with the issuer.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id at the identity provider.
    pub sub: Uuid,
    /// The user's role name (e.g. `"admin"`, `"user"`).
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for JWT validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the token issuer.
    pub secret: String,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self { secret }
    }
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Validates the signature, expiration, and issued-at claims automatically.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    #[test]
    fn valid_token_round_trips() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let now = chrono::Utc::now().timestamp();

        let token = sign(
            &Claims {
                sub: user_id,
                role: "user".to_string(),
                exp: now + 900,
                iat: now,
            },
            &config.secret,
        );

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn expired_token_fails() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();

        // Expired well past the default 60-second leeway.
        let token = sign(
            &Claims {
                sub: Uuid::new_v4(),
                role: "user".to_string(),
                exp: now - 300,
                iat: now - 600,
            },
            &config.secret,
        );

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn token_signed_with_different_secret_fails() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();

        let token = sign(
            &Claims {
                sub: Uuid::new_v4(),
                role: "user".to_string(),
                exp: now + 900,
                iat: now,
            },
            "some-other-secret",
        );

        assert!(validate_token(&token, &config).is_err());
    }
}
