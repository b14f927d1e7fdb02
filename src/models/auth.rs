// Authentication claim models for RampDesk Backend

use serde::{Deserialize, Serialize};

/// Access token claims, validated on every protected request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,

    /// JWT ID
    pub jti: String,

    /// User email address
    pub email: String,

    /// Audience (aud)
    pub aud: String,

    /// Issuer (iss)
    pub iss: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: i64,
}
