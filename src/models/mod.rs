//! Data Models Module
//!
//! Member entities, token claim sets, and request/response types.

pub mod claims;
pub mod member;
pub mod requests;

// Re-export commonly used types
pub use claims::{SessionClaims, VerificationClaims};
pub use member::{Member, VerificationStatus};
pub use requests::*;
