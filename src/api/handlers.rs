//! API Handlers
//!
//! HTTP request handlers for the authentication endpoints. Handlers parse
//! and validate payloads, delegate to the services, and shape responses.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use validator::Validate;

use crate::api::middleware::AuthMember;
use crate::models::{
    ChangePasswordRequest, HealthCheckResponse, LoginResponse, MessageResponse,
    PasswordResetRequest, RegisterRequest, RegisterResponse, ResendVerificationRequest,
    SubmitPasswordResetRequest, VerifyResponse,
};
use crate::database::DatabasePool;
use crate::service::{MemberService, TokenService};
use crate::utils::error::{AppError, AppResult};

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub member_service: Arc<MemberService>,
    pub token_service: Arc<TokenService>,
    pub pool: DatabasePool,
}

/// Health check endpoint: liveness plus a database ping.
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthCheckResponse>> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    Ok(Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    }))
}

/// Register a new member account.
///
/// `POST /auth`
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let member = state
        .member_service
        .register(
            &payload.first,
            &payload.last,
            payload.username.as_deref(),
            &payload.email,
            &payload.password,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Verification Email Sent!".to_string(),
            email: member.email,
        }),
    ))
}

/// Log in with Basic credentials and receive a session token.
///
/// `GET /auth`
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let (email, password) = basic_credentials(&headers)?;

    let (_, token) = state.member_service.login(&email, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            success: true,
            message: "Login Successful!".to_string(),
            token,
        }),
    ))
}

/// Consume an emailed verification token.
///
/// `GET /auth/verify/{token}`
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let email = state.member_service.consume_verification(&token).await?;

    Ok(Json(VerifyResponse {
        success: true,
        message: "Email Successfully Verified!".to_string(),
        email,
    }))
}

/// Re-send the verification email to an unverified member.
///
/// `POST /auth/verify`
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(payload): Json<ResendVerificationRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .member_service
        .resend_verification(&payload.email)
        .await?;

    Ok(Json(MessageResponse::new("Verification Email Sent!")))
}

/// Change the authenticated member's password.
///
/// `PUT /auth/password`
pub async fn change_password(
    State(state): State<AppState>,
    Extension(member): Extension<AuthMember>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .member_service
        .change_password(member.member_id, &payload.old_password, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password Successfully Changed!")))
}

/// Start a password reset by email.
///
/// `POST /auth/password/reset`
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .member_service
        .request_password_reset(&payload.email)
        .await?;

    Ok(Json(MessageResponse::new("Password Reset Email Sent!")))
}

/// Complete a password reset with an emailed token.
///
/// `PUT /auth/password/reset/{token}`
pub async fn submit_password_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<SubmitPasswordResetRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .member_service
        .reset_password(&token, &payload.password)
        .await?;

    Ok(Json(MessageResponse::new("Password Successfully Reset!")))
}

/// Extract `email:password` from a Basic Authorization header.
///
/// A missing or malformed header is a validation failure (the request is
/// incomplete); only a hash-compare mismatch counts as an authentication
/// failure.
fn basic_credentials(headers: &HeaderMap) -> AppResult<(String, String)> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation("Missing Authorization Header".to_string()))?;

    let encoded = value
        .strip_prefix("Basic ")
        .ok_or_else(|| AppError::Validation("Basic Authorization Required".to_string()))?;

    let decoded = BASE64
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| AppError::Validation("Malformed Authorization Header".to_string()))?;

    let (email, password) = decoded
        .split_once(':')
        .ok_or_else(|| AppError::Validation("Malformed Authorization Header".to_string()))?;

    Ok((email.to_string(), password.to_string()))
}
