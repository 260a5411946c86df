//! Service Layer
//!
//! Business logic for member accounts, identity tokens, and outbound email.

pub mod email;
pub mod member;
pub mod token;

pub use email::{EmailConfig, EmailService, Notifier, TokenPurpose};
pub use member::MemberService;
pub use token::{TokenError, TokenService};
