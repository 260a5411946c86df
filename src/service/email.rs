//! Email Service
//!
//! Outbound notification collaborator: delivers token-bearing verification
//! and password-reset links over SMTP.

use anyhow::Result;
use async_trait::async_trait;
use lettre::{
    message::{header, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{error, info};

use crate::utils::error::{AppError, AppResult};

/// Which message template a token email uses, and which link it embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    /// Account verification link (`/auth/verify/{token}`)
    Verification,
    /// Password reset link (`/auth/password/reset/{token}`)
    PasswordReset,
}

impl TokenPurpose {
    fn subject(self) -> &'static str {
        match self {
            Self::Verification => "Verify your chat account!",
            Self::PasswordReset => "Reset your chat account password",
        }
    }

    fn link(self, base_url: &str, token: &str) -> String {
        match self {
            Self::Verification => format!("{}/auth/verify/{}", base_url, token),
            Self::PasswordReset => format!("{}/auth/password/reset/{}", base_url, token),
        }
    }
}

/// Notification collaborator consumed by the member workflows.
///
/// The member service only needs "deliver this token to this address for
/// this purpose"; SMTP is one implementation, tests substitute their own.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        first_name: &str,
        token: &str,
        purpose: TokenPurpose,
    ) -> AppResult<()>;
}

/// Email service configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: String,
    /// From email address
    pub from_email: String,
    /// From name (display name)
    pub from_name: String,
    /// Base URL embedded in token links
    pub app_base_url: String,
}

impl EmailConfig {
    /// Create email configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME")
                .map_err(|_| anyhow::anyhow!("SMTP_USERNAME environment variable is required"))?,
            smtp_password: std::env::var("SMTP_PASSWORD")
                .map_err(|_| anyhow::anyhow!("SMTP_PASSWORD environment variable is required"))?,
            from_email: std::env::var("FROM_EMAIL")
                .map_err(|_| anyhow::anyhow!("FROM_EMAIL environment variable is required"))?,
            from_name: std::env::var("FROM_NAME").unwrap_or_else(|_| "FastChat".to_string()),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
        })
    }
}

/// SMTP-backed notification sender
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl EmailService {
    /// Create a new email service
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::Configuration(format!("Failed to configure SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { transport, config })
    }

    /// Send a token-bearing link to a member.
    ///
    /// `purpose` selects the template and the link path. Failure is reported
    /// to the caller; the registration workflow compensates by deleting the
    /// partially-created member row.
    pub async fn send_token_email(
        &self,
        recipient: &str,
        first_name: &str,
        token: &str,
        purpose: TokenPurpose,
    ) -> AppResult<()> {
        info!("Sending {:?} email to: {}", purpose, recipient);

        let link = purpose.link(&self.config.app_base_url, token);

        let (action, window) = match purpose {
            TokenPurpose::Verification => ("verify your account", "10 minutes"),
            TokenPurpose::PasswordReset => ("reset your password", "10 minutes"),
        };

        let text_body = format!(
            "Hello {},\n\nPlease {} by clicking on the following link:\n{}\n\nThe link expires in {}.\n\nIf you didn't request this, you can safely ignore this email.\n\nThe {} Team",
            first_name, action, link, window, self.config.from_name
        );

        let html_body = format!(
            r#"<p>Hello {},</p>
<p>Please {} by clicking on the following link:</p>
<p><a href="{}">{}</a></p>
<p>The link expires in {}.</p>
<p>If you didn't request this, you can safely ignore this email.</p>
<p>The {} Team</p>"#,
            first_name, action, link, link, window, self.config.from_name
        );

        let message = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| AppError::Configuration(format!("Invalid from address: {}", e)))?,
            )
            .to(recipient
                .parse()
                .map_err(|e| AppError::Validation(format!("Invalid recipient email: {}", e)))?)
            .subject(purpose.subject())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email message: {}", e)))?;

        match self.transport.send(message).await {
            Ok(_) => {
                info!("{:?} email sent to: {}", purpose, recipient);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send {:?} email to {}: {}", purpose, recipient, e);
                Err(AppError::Notification(format!("Failed to send email: {}", e)))
            }
        }
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn send(
        &self,
        recipient: &str,
        first_name: &str,
        token: &str,
        purpose: TokenPurpose,
    ) -> AppResult<()> {
        self.send_token_email(recipient, first_name, token, purpose)
            .await
    }
}
