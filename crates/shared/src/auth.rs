//! Authentication types for Supabase-issued JWTs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims carried by a Supabase Auth access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID, also the `profiles` primary key).
    pub sub: Uuid,
    /// Email address of the user, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Postgres role the token maps to (`authenticated` for signed-in users).
    pub role: String,
    /// Audience.
    pub aud: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        email: Option<String>,
        audience: &str,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id,
            email,
            role: "authenticated".to_string(),
            aud: audience.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}
