//! Chat Auth Service Library
//!
//! Credential and identity-lifecycle service for a chat application:
//! member registration, login, email verification, and password
//! change/reset flows.
//!
//! # Features
//!
//! - **Salted Credential Storage**: per-member CSPRNG salt with a
//!   deterministic SHA-256 digest, regenerated on every password change
//! - **Signed Identity Tokens**: HS256 JWTs with distinct validity windows
//!   (10-minute verification/reset links, 14-day sessions)
//! - **Verification State Machine**: accounts start unverified; a dead
//!   verification token purges the abandoned registration so the email and
//!   username free up again
//! - **Compensating Writes**: a failed verification email rolls back the
//!   registration it belongs to
//! - **Flexible Router**: per-endpoint toggles via the RouterBuilder pattern
//! - **Database Integration**: PostgreSQL with connection pooling
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chat_auth::service::{EmailConfig, EmailService, MemberService, TokenService};
//! use sqlx::PgPool;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = PgPool::connect("postgres://localhost/chat").await?;
//!     let tokens = Arc::new(TokenService::new(std::env::var("JWT_SECRET")?));
//!     let email = Arc::new(EmailService::new(EmailConfig::from_env()?)?);
//!     let members = MemberService::new(pool, tokens, email);
//!
//!     let member = members
//!         .register("Fast", "Chat", None, "fastchat@mail.com", "FastChatPass1!")
//!         .await?;
//!     println!("Registered {} ({})", member.username, member.member_id);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod database;
pub mod models;
pub mod service;
pub mod utils;

pub use api::{create_routes, AppState, RouterBuilder};
pub use config::AppConfig;
pub use database::{create_pool, DatabaseConfig, DatabasePool};
pub use models::{Member, VerificationStatus};
pub use service::{EmailService, MemberService, Notifier, TokenService};
pub use utils::error::{AppError, AppResult};

/// Crate version, reported by the health endpoint
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
