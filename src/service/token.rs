//! Token Service
//!
//! Mints and validates the signed, time-bounded identity tokens used for
//! email verification, password reset, and login sessions. The signing
//! secret is injected once at construction and never mutated.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{SessionClaims, VerificationClaims};

/// Errors surfaced by token verification and minting
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// Signature does not match, or the token is malformed
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Signature matches but the embedded expiry has passed
    #[error("Token has expired")]
    Expired,

    /// Token could not be encoded
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Result type for token operations
pub type TokenResult<T> = Result<T, TokenError>;

/// Service minting and checking identity tokens with a shared HS256 secret
#[derive(Clone)]
pub struct TokenService {
    /// Process-wide signing secret, loaded once at startup
    secret: String,
    /// Session token lifetime (default: 14 days)
    session_ttl: Duration,
    /// Verification and password-reset token lifetime (default: 10 minutes)
    verification_ttl: Duration,
}

impl TokenService {
    /// Create a token service with the default validity windows.
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            session_ttl: Duration::days(14),
            verification_ttl: Duration::minutes(10),
        }
    }

    /// Create a token service with custom validity windows.
    pub fn with_ttls(secret: String, session_ttl: Duration, verification_ttl: Duration) -> Self {
        Self {
            secret,
            session_ttl,
            verification_ttl,
        }
    }

    /// Lifetime applied to verification and reset tokens.
    pub fn verification_ttl(&self) -> Duration {
        self.verification_ttl
    }

    /// Mint an email-verification token (10-minute TTL).
    pub fn issue_verification(
        &self,
        member_id: Uuid,
        first_name: &str,
        email: &str,
    ) -> TokenResult<String> {
        let now = Utc::now();
        let claims = VerificationClaims::new(
            member_id,
            first_name.to_string(),
            email.to_string(),
            now,
            now + self.verification_ttl,
        );
        self.encode_claims(&claims)
    }

    /// Mint a password-reset token. Same claim set and TTL as verification;
    /// the consuming endpoint determines the purpose.
    pub fn issue_reset(
        &self,
        member_id: Uuid,
        first_name: &str,
        email: &str,
    ) -> TokenResult<String> {
        self.issue_verification(member_id, first_name, email)
    }

    /// Mint a session token (14-day TTL) after successful authentication.
    pub fn issue_session(
        &self,
        member_id: Uuid,
        username: &str,
        email: &str,
    ) -> TokenResult<String> {
        let now = Utc::now();
        let claims = SessionClaims::new(
            member_id,
            username.to_string(),
            email.to_string(),
            now,
            now + self.session_ttl,
        );
        self.encode_claims(&claims)
    }

    /// Verify a token's signature and decode its claims.
    ///
    /// With `ignore_expiration` set, an expired-but-authentic token still
    /// decodes successfully so the caller can apply its own expiry policy
    /// (the verification purge path does exactly that).
    pub fn verify<C: DeserializeOwned>(
        &self,
        token: &str,
        ignore_expiration: bool,
    ) -> TokenResult<C> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = !ignore_expiration;
        validation.validate_aud = false;

        let decoding_key = DecodingKey::from_secret(self.secret.as_ref());

        decode::<C>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })
    }

    /// Decode claims WITHOUT verifying the signature.
    ///
    /// Only the account-cleanup path uses this, to recover the member id
    /// embedded in a token that already failed verification. The result must
    /// never be treated as proof of identity.
    pub fn decode_unverified<C: DeserializeOwned>(&self, token: &str) -> TokenResult<C> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let decoding_key = DecodingKey::from_secret(self.secret.as_ref());

        decode::<C>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidSignature)
    }

    fn encode_claims<C: serde::Serialize>(&self, claims: &C) -> TokenResult<String> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(self.secret.as_ref());

        encode(&header, claims, &encoding_key).map_err(|e| TokenError::Encoding(e.to_string()))
    }
}
