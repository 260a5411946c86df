//! Token Claim Models
//!
//! JWT claim sets for the identity tokens the service mints. Tokens are
//! transient: they are never persisted, only signed, handed to the client
//! (via email link or API response), and verified on the way back in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims for email-verification and password-reset tokens.
///
/// The two purposes share a claim set; which one a token means is decided by
/// the endpoint that receives it, not by the token itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationClaims {
    /// Member this token asserts control over
    pub member_id: Uuid,

    /// First name, embedded for the email greeting
    pub first_name: String,

    /// Email address the token was sent to
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl VerificationClaims {
    pub fn new(
        member_id: Uuid,
        first_name: String,
        email: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            member_id,
            first_name,
            email,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Whether the embedded expiry has passed, for callers that verified the
    /// token with expiration checking disabled.
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }
}

/// Claims for session (login) tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated member
    pub member_id: Uuid,

    /// Username at login time
    pub username: String,

    /// Email at login time
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(
        member_id: Uuid,
        username: String,
        email: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            member_id,
            username,
            email,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}
