//! Member Service
//!
//! Account lifecycle workflows: registration, login, email verification,
//! and credential changes. Every write goes through this service; handlers
//! only parse requests and map results onto HTTP.

use std::sync::Arc;

use log::{error, info, warn};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::member::MemberWithCredentials;
use crate::models::{Member, VerificationClaims};
use crate::service::email::{Notifier, TokenPurpose};
use crate::service::token::{TokenError, TokenService};
use crate::utils::credential::{generate_hash, generate_salt, is_valid_password, verify_password, SALT_LENGTH};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{is_provided, is_valid_username};

const MEMBER_COLUMNS: &str =
    "member_id, first_name, last_name, username, email, password_hash, salt, verified, created_at, updated_at";

/// Service orchestrating member accounts and their credentials
pub struct MemberService {
    pool: PgPool,
    tokens: Arc<TokenService>,
    notifier: Arc<dyn Notifier>,
}

impl MemberService {
    /// Create a new member service
    pub fn new(pool: PgPool, tokens: Arc<TokenService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            pool,
            tokens,
            notifier,
        }
    }

    /// Register a new member account.
    ///
    /// The account is created unverified, with a fresh salt and the salted
    /// hash of the supplied password. A verification token is minted and
    /// emailed; if delivery fails the row is deleted again so the caller can
    /// retry registration from scratch.
    pub async fn register(
        &self,
        first: &str,
        last: &str,
        username: Option<&str>,
        email: &str,
        password: &str,
    ) -> AppResult<Member> {
        if !is_provided(first) || !is_provided(last) || !is_provided(email) || !is_provided(password)
        {
            return Err(AppError::Validation(
                "Missing Required Information".to_string(),
            ));
        }

        if !is_valid_password(password) {
            return Err(AppError::Validation(
                "Password Does Not Meet Minimum Requirements".to_string(),
            ));
        }

        // The email stands in as the username when none was chosen.
        let username = match username {
            Some(name) if is_provided(name) => name,
            _ => email,
        };
        if !is_valid_username(username) {
            return Err(AppError::Validation(
                "Username Does Not Meet Minimum Requirements".to_string(),
            ));
        }

        let salt = generate_salt(SALT_LENGTH);
        let password_hash = generate_hash(password, &salt);

        info!("Registering new member: {}", email);

        let query = format!(
            "INSERT INTO members (first_name, last_name, username, email, password_hash, salt)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            MEMBER_COLUMNS
        );
        let row = sqlx::query_as::<_, MemberWithCredentials>(&query)
            .bind(first)
            .bind(last)
            .bind(username)
            .bind(email)
            .bind(&password_hash)
            .bind(&salt)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        let token = self
            .tokens
            .issue_verification(row.member_id, &row.first_name, &row.email)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if let Err(e) = self
            .notifier
            .send(&row.email, &row.first_name, &token, TokenPurpose::Verification)
            .await
        {
            // Undo the insert so the address is free for another attempt.
            error!(
                "Verification email failed for {}, removing member: {}",
                row.email, e
            );
            self.delete_member(row.member_id).await?;
            return Err(e);
        }

        info!("Member registered: {} ({})", row.email, row.member_id);
        Ok(row.into())
    }

    /// Authenticate a member and mint a session token.
    ///
    /// The stored hash is recomputed from the candidate password and the
    /// member's salt; nothing else is accepted as proof. Unverified accounts
    /// cannot log in even with the correct password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(Member, String)> {
        if !is_provided(email) || !is_provided(password) {
            return Err(AppError::Validation(
                "Missing Required Information".to_string(),
            ));
        }

        let row = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Credentials Did Not Match".to_string()))?;

        if !verify_password(password, &row.password_hash, &row.salt) {
            warn!("Failed login attempt for: {}", email);
            return Err(AppError::Authentication(
                "Credentials Did Not Match".to_string(),
            ));
        }

        if !row.verified {
            return Err(AppError::Authentication("Email Not Verified".to_string()));
        }

        let token = self
            .tokens
            .issue_session(row.member_id, &row.username, &row.email)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        info!("Member logged in: {}", email);
        Ok((row.into(), token))
    }

    /// Send a fresh verification email to an unverified member.
    pub async fn resend_verification(&self, email: &str) -> AppResult<String> {
        if !is_provided(email) {
            return Err(AppError::Validation(
                "Missing Required Information".to_string(),
            ));
        }

        let row = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User Not Found".to_string()))?;

        if row.verified {
            return Err(AppError::Validation("Email Already Verified".to_string()));
        }

        let token = self
            .tokens
            .issue_verification(row.member_id, &row.first_name, &row.email)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        self.notifier
            .send(&row.email, &row.first_name, &token, TokenPurpose::Verification)
            .await?;

        info!("Verification email re-sent to: {}", email);
        Ok(row.email)
    }

    /// Consume an emailed verification token.
    ///
    /// An authentic, in-date token flips the member to verified. An expired
    /// or wrongly-signed token that still names an unverified member deletes
    /// that member, forcing a clean re-registration; a token naming a member
    /// who already verified is reported as such without touching the row.
    /// Tokens that cannot be decoded at all cause no mutation.
    pub async fn consume_verification(&self, token: &str) -> AppResult<String> {
        match self
            .tokens
            .verify::<VerificationClaims>(token, true)
        {
            Ok(claims) => {
                if claims.is_expired() {
                    self.purge_unverified(claims.member_id).await
                } else {
                    self.mark_verified(claims.member_id).await
                }
            }
            Err(TokenError::InvalidSignature) => {
                // Recover the member id from the rejected token so a stale
                // signed-up-but-never-verified account does not linger.
                match self.tokens.decode_unverified::<VerificationClaims>(token) {
                    Ok(claims) => self.purge_unverified(claims.member_id).await,
                    Err(_) => Err(AppError::Token(
                        "Invalid Verification Token".to_string(),
                    )),
                }
            }
            Err(e) => Err(AppError::Token(e.to_string())),
        }
    }

    /// Change the password of an authenticated member.
    ///
    /// The old password must re-verify against the stored hash before the
    /// credential pair is replaced. A new salt is always generated.
    pub async fn change_password(
        &self,
        member_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        if !is_provided(old_password) || !is_provided(new_password) {
            return Err(AppError::Validation(
                "Missing Required Information".to_string(),
            ));
        }

        let row = self
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User Not Found".to_string()))?;

        if !verify_password(old_password, &row.password_hash, &row.salt) {
            return Err(AppError::Validation(
                "Old Password Does Not Match".to_string(),
            ));
        }

        if !is_valid_password(new_password) {
            return Err(AppError::Validation(
                "Password Does Not Meet Minimum Requirements".to_string(),
            ));
        }

        self.store_credentials(member_id, new_password).await?;
        info!("Password changed for member: {}", member_id);
        Ok(())
    }

    /// Start a password reset by emailing a reset token (phase A).
    pub async fn request_password_reset(&self, email: &str) -> AppResult<String> {
        if !is_provided(email) {
            return Err(AppError::Validation(
                "Missing Required Information".to_string(),
            ));
        }

        let row = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User Not Found".to_string()))?;

        let token = self
            .tokens
            .issue_reset(row.member_id, &row.first_name, &row.email)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        self.notifier
            .send(&row.email, &row.first_name, &token, TokenPurpose::PasswordReset)
            .await?;

        info!("Password reset requested for: {}", email);
        Ok(row.email)
    }

    /// Complete a password reset with an emailed token (phase B).
    ///
    /// Possession of an authentic, in-date token replaces knowledge of the
    /// old password. Expired or tampered tokens are rejected outright; the
    /// reset path never deletes accounts.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        if !is_provided(new_password) {
            return Err(AppError::Validation(
                "Missing Required Information".to_string(),
            ));
        }

        let claims = self
            .tokens
            .verify::<VerificationClaims>(token, false)
            .map_err(|e| match e {
                TokenError::Expired => {
                    AppError::Token("Password Reset Token Expired".to_string())
                }
                _ => AppError::Token("Invalid Password Reset Token".to_string()),
            })?;

        if !is_valid_password(new_password) {
            return Err(AppError::Validation(
                "Password Does Not Meet Minimum Requirements".to_string(),
            ));
        }

        let row = self
            .find_by_id(claims.member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User Not Found".to_string()))?;

        self.store_credentials(row.member_id, new_password).await?;
        info!("Password reset completed for: {}", row.email);
        Ok(())
    }

    /// Fetch a member by id for authenticated request handling.
    pub async fn get_member(&self, member_id: Uuid) -> AppResult<Member> {
        self.find_by_id(member_id)
            .await?
            .map(Member::from)
            .ok_or_else(|| AppError::NotFound("User Not Found".to_string()))
    }

    // Finalize verification. Anything other than "exists and is still
    // unverified" — including a row a failed earlier attempt deleted —
    // reports the token as already spent.
    async fn mark_verified(&self, member_id: Uuid) -> AppResult<String> {
        let row = match self.find_by_id(member_id).await? {
            Some(row) if !row.verified => row,
            _ => return Err(AppError::Validation("Email Already Verified".to_string())),
        };

        let result =
            sqlx::query("UPDATE members SET verified = TRUE, updated_at = NOW() WHERE member_id = $1")
                .bind(member_id)
                .execute(&self.pool)
                .await;

        match result {
            Ok(done) if done.rows_affected() == 1 => {
                info!("Member verified: {}", row.email);
                Ok(row.email)
            }
            other => {
                // The flip failed mid-flow; remove the half-registered
                // account so the member can start over.
                if let Err(e) = other {
                    error!("Verification update failed for {}: {}", member_id, e);
                }
                self.delete_member(member_id).await?;
                Err(AppError::Internal("Error Verifying Email".to_string()))
            }
        }
    }

    // A dead token arrived. Verified members keep their account; anyone
    // still unverified is purged so the email address frees up again.
    async fn purge_unverified(&self, member_id: Uuid) -> AppResult<String> {
        let row = self.find_by_id(member_id).await?;

        if let Some(row) = row {
            if row.verified {
                return Err(AppError::Validation("Email Already Verified".to_string()));
            }
            warn!("Purging unverified member {} after dead token", row.email);
            self.delete_member(member_id).await?;
        }

        // Covers both the expired and the bad-signature path; the message
        // must not confirm to a forger that their token merely expired.
        Err(AppError::Token(
            "Verification Token Invalid or Expired, Please Register Again".to_string(),
        ))
    }

    // Replace the credential pair with a fresh salt and hash.
    async fn store_credentials(&self, member_id: Uuid, password: &str) -> AppResult<()> {
        let salt = generate_salt(SALT_LENGTH);
        let password_hash = generate_hash(password, &salt);

        sqlx::query(
            "UPDATE members SET password_hash = $1, salt = $2, updated_at = NOW() WHERE member_id = $3",
        )
        .bind(&password_hash)
        .bind(&salt)
        .bind(member_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<MemberWithCredentials>> {
        let query = format!("SELECT {} FROM members WHERE email = $1", MEMBER_COLUMNS);
        let row = sqlx::query_as::<_, MemberWithCredentials>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, member_id: Uuid) -> AppResult<Option<MemberWithCredentials>> {
        let query = format!(
            "SELECT {} FROM members WHERE member_id = $1",
            MEMBER_COLUMNS
        );
        let row = sqlx::query_as::<_, MemberWithCredentials>(&query)
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_member(&self, member_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM members WHERE member_id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Translate unique-constraint violations into conflict errors the client
/// can act on; everything else passes through as a database error.
fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.constraint() {
            Some("members_email_key") => {
                return AppError::Conflict("Email Already Exists".to_string())
            }
            Some("members_username_key") => {
                return AppError::Conflict("Username Already Exists".to_string())
            }
            _ => {}
        }
    }
    AppError::Database(err)
}
