use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user information extracted from the JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub token_id: String,
    pub email: String,
    pub exp: i64,
}
