//! Authentication Middleware
//!
//! Bearer-token authentication for routes that require a logged-in member.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::models::SessionClaims;
use crate::service::{TokenError, TokenService};
use crate::utils::error::AppError;

/// Identity of the authenticated member, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthMember {
    pub member_id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<SessionClaims> for AuthMember {
    fn from(claims: SessionClaims) -> Self {
        Self {
            member_id: claims.member_id,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Require a valid Bearer session token.
///
/// On success the decoded identity is attached to the request for handlers
/// downstream; on failure the request never reaches them.
pub async fn require_auth(
    State(token_service): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Authentication("Authentication Required".to_string()))?;

    let claims = token_service
        .verify::<SessionClaims>(token, false)
        .map_err(|e| match e {
            TokenError::Expired => AppError::Token("Session Expired".to_string()),
            _ => AppError::Token("Invalid Session Token".to_string()),
        })?;

    request.extensions_mut().insert(AuthMember::from(claims));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{
        body::Body, http::Request as HttpRequest, middleware::from_fn_with_state, routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    async fn protected_handler() -> &'static str {
        "OK"
    }

    fn protected_app(service: Arc<TokenService>) -> Router {
        Router::new()
            .route("/protected", get(protected_handler))
            .layer(from_fn_with_state(service, require_auth))
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let app = protected_app(Arc::new(TokenService::new(
            "test_signing_secret_key".to_string(),
        )));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_forbidden() {
        let app = protected_app(Arc::new(TokenService::new(
            "test_signing_secret_key".to_string(),
        )));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_valid_session_passes_through() {
        let service = Arc::new(TokenService::new("test_signing_secret_key".to_string()));
        let token = service
            .issue_session(Uuid::new_v4(), "fastchat", "fastchat@mail.com")
            .unwrap();
        let app = protected_app(service);

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
