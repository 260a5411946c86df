//! Utilities Module
//!
//! Shared utilities for error handling, credential hashing, and validation.

pub mod credential;
pub mod error;
pub mod validation;

// Re-export commonly used utilities
pub use credential::{generate_hash, generate_salt, is_valid_password, SALT_LENGTH};
pub use error::{AppError, AppResult, ErrorResponse};
pub use validation::{is_provided, is_valid_username, validate_email};
