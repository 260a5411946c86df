//! Member Model
//!
//! Core member data structures and the verification status enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account verification status.
///
/// Every member starts `Unverified` and transitions to `Verified` exactly
/// once, through the email verification flow. `Verified` is terminal; no
/// code path reverts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Unverified,
    Verified,
}

impl VerificationStatus {
    /// Map from the boolean column the members table stores.
    pub fn from_flag(verified: bool) -> Self {
        if verified {
            Self::Verified
        } else {
            Self::Unverified
        }
    }

    pub fn is_verified(self) -> bool {
        self == Self::Verified
    }
}

/// Member representation for external API responses
///
/// Never carries the password hash or salt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier, generated by storage on insert
    pub member_id: Uuid,

    /// Member's first name
    pub first_name: String,

    /// Member's last name
    pub last_name: String,

    /// Unique username; defaults to the email at registration
    pub username: String,

    /// Unique email address (stored case-sensitively)
    pub email: String,

    /// Whether the member completed email verification
    pub status: VerificationStatus,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the row was last modified
    pub updated_at: DateTime<Utc>,
}

/// Internal member representation including the credential pair
///
/// Used only for storage reads that need to verify a password. The hash and
/// salt are always read and written together; they are stripped before
/// anything crosses the API boundary.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MemberWithCredentials {
    pub member_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberWithCredentials> for Member {
    /// Strips the credential pair so it is never exposed in responses.
    fn from(row: MemberWithCredentials) -> Self {
        Member {
            member_id: row.member_id,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            email: row.email,
            status: VerificationStatus::from_flag(row.verified),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
