// JWT access token validation
//
// Identity lives in an external provider; this service only verifies the
// HS256 access tokens it issues. The `sub` claim is the provider's user
// id and keys the user_roles table.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::models::auth::AccessTokenClaims;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token validation failed: {0}")]
    ValidationFailed(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken
            | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
            _ => JwtError::ValidationFailed(error.to_string()),
        }
    }
}

pub struct JwtService {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    audience: String,
    issuer: String,
}

impl JwtService {
    pub fn new(access_secret: &str, audience: String, issuer: String) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(access_secret.as_bytes()),
            algorithm: Algorithm::HS256,
            audience,
            issuer,
        }
    }

    pub fn from_config() -> Self {
        let jwt = &crate::app_config::config().jwt;
        Self::new(&jwt.access_secret, jwt.audience.clone(), jwt.issuer.clone())
    }

    /// Validates an access token and returns the decoded claims.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[self.audience.clone()]);
        validation.set_issuer(&[self.issuer.clone()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const TEST_SECRET: &str = "test-access-secret-hs256-at-least-32-chars";
    const TEST_AUDIENCE: &str = "test.rampdesk.io";
    const TEST_ISSUER: &str = "test.rampdesk.io";

    fn test_service() -> JwtService {
        JwtService::new(
            TEST_SECRET,
            TEST_AUDIENCE.to_string(),
            TEST_ISSUER.to_string(),
        )
    }

    fn mint_token(secret: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: Uuid::new_v4().to_string(),
            jti: Uuid::new_v4().to_string(),
            email: "admin@example.com".to_string(),
            aud: TEST_AUDIENCE.to_string(),
            iss: TEST_ISSUER.to_string(),
            iat: now,
            exp: now + exp_offset_secs,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_decodes() {
        let service = test_service();
        let token = mint_token(TEST_SECRET, 3600);

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.aud, TEST_AUDIENCE);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = test_service();
        let token = mint_token(TEST_SECRET, -60);

        let result = service.validate_access_token(&token);
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let service = test_service();
        let token = mint_token("some-other-secret-also-32-chars-long!!", 3600);

        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = test_service();
        assert!(service.validate_access_token("not.a.jwt").is_err());
    }
}
