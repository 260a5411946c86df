//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::email_validator;

/// Request payload for registering a new member
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Member's first name
    pub first: String,

    /// Member's last name
    pub last: String,

    /// Optional unique username; the email is used when absent
    pub username: Option<String>,

    /// Member's email address (must be unique and valid format)
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    /// Member's password (strength policy enforced by the service)
    pub password: String,
}

/// Request payload for re-requesting a verification email
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResendVerificationRequest {
    #[validate(custom(function = "email_validator"))]
    pub email: String,
}

/// Request payload for an authenticated password change
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password, proving the caller knows the old credential
    #[validate(length(min = 1, message = "Old password cannot be empty"))]
    pub old_password: String,

    /// Replacement password (strength policy enforced by the service)
    #[validate(length(min = 1, message = "New password cannot be empty"))]
    pub new_password: String,
}

/// Request payload for password reset phase A (forgot password)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(custom(function = "email_validator"))]
    pub email: String,
}

/// Request payload for password reset phase B (token + new password)
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitPasswordResetRequest {
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// Response for successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub email: String,
}

/// Response for successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

/// Response for successful email verification
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub email: String,
}

/// Generic success response for workflows with no payload
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

/// Response for health check
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            first: "Fast".to_string(),
            last: "Chat".to_string(),
            username: None,
            email: "fastchat@mail.com".to_string(),
            password: "FastChatPass1!".to_string(),
        };

        assert!(request.validate().is_ok());

        let invalid = RegisterRequest {
            email: "not-an-email".to_string(),
            ..request
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_change_password_request_validation() {
        let request = ChangePasswordRequest {
            old_password: "OldPass1!".to_string(),
            new_password: "NewPass1!".to_string(),
        };
        assert!(request.validate().is_ok());

        let empty_old = ChangePasswordRequest {
            old_password: "".to_string(),
            new_password: "NewPass1!".to_string(),
        };
        assert!(empty_old.validate().is_err());
    }

    #[test]
    fn test_message_response() {
        let response = MessageResponse::new("Password Successfully Changed!");
        assert!(response.success);
        assert_eq!(response.message, "Password Successfully Changed!");
    }
}
