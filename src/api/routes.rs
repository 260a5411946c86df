//! API Route Definitions
//!
//! HTTP routes assembled through a builder so deployments can enable only
//! the endpoints they need (e.g. a registration-only service, or a
//! verification worker without the password routes).

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::api::handlers::{self, AppState};
use crate::api::middleware::require_auth;

/// Builder for creating API routes with configurable endpoints
#[derive(Default)]
pub struct RouterBuilder {
    /// Health check endpoint (GET /health)
    health_check: bool,
    /// Registration endpoint (POST /auth)
    register: bool,
    /// Basic-auth login endpoint (GET /auth)
    login: bool,
    /// Verification-token consumption endpoint (GET /auth/verify/{token})
    verify_email: bool,
    /// Verification re-request endpoint (POST /auth/verify)
    resend_verification: bool,
    /// Authenticated password change endpoint (PUT /auth/password)
    change_password: bool,
    /// Password reset endpoints (POST /auth/password/reset,
    /// PUT /auth/password/reset/{token})
    password_reset: bool,
}

impl RouterBuilder {
    /// Creates a new router builder with all routes disabled by default
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router builder with all routes enabled
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            register: true,
            login: true,
            verify_email: true,
            resend_verification: true,
            change_password: true,
            password_reset: true,
        }
    }

    /// Creates a router builder with only the health check enabled
    pub fn with_minimal_routes() -> Self {
        Self {
            health_check: true,
            ..Self::default()
        }
    }

    /// Enables or disables the health check endpoint
    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    /// Enables or disables the registration endpoint
    pub fn register(mut self, enabled: bool) -> Self {
        self.register = enabled;
        self
    }

    /// Enables or disables the login endpoint
    pub fn login(mut self, enabled: bool) -> Self {
        self.login = enabled;
        self
    }

    /// Enables or disables the verification-token consumption endpoint
    pub fn verify_email(mut self, enabled: bool) -> Self {
        self.verify_email = enabled;
        self
    }

    /// Enables or disables the verification re-request endpoint
    pub fn resend_verification(mut self, enabled: bool) -> Self {
        self.resend_verification = enabled;
        self
    }

    /// Enables or disables the authenticated password change endpoint
    pub fn change_password(mut self, enabled: bool) -> Self {
        self.change_password = enabled;
        self
    }

    /// Enables or disables the two password reset endpoints
    pub fn password_reset(mut self, enabled: bool) -> Self {
        self.password_reset = enabled;
        self
    }

    /// Builds the Axum router with the configured routes
    pub fn build(self, state: AppState) -> Router {
        let mut router = Router::new();

        if self.health_check {
            router = router.route("/health", get(handlers::health_check));
        }

        if self.register {
            router = router.route("/auth", post(handlers::register));
        }

        if self.login {
            router = router.route("/auth", get(handlers::login));
        }

        if self.resend_verification {
            router = router.route("/auth/verify", post(handlers::resend_verification));
        }

        if self.verify_email {
            router = router.route("/auth/verify/{token}", get(handlers::verify_email));
        }

        if self.change_password {
            // Requires a live session; the reset routes stay open because
            // they exist for members who cannot log in.
            let protected = Router::new()
                .route("/auth/password", put(handlers::change_password))
                .route_layer(from_fn_with_state(
                    state.token_service.clone(),
                    require_auth,
                ));
            router = router.merge(protected);
        }

        if self.password_reset {
            router = router
                .route(
                    "/auth/password/reset",
                    post(handlers::request_password_reset),
                )
                .route(
                    "/auth/password/reset/{token}",
                    put(handlers::submit_password_reset),
                );
        }

        router.layer(CorsLayer::permissive()).with_state(state)
    }
}

/// Creates a router with every endpoint enabled
pub fn create_routes(state: AppState) -> Router {
    RouterBuilder::with_all_routes().build(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{MemberService, Notifier, TokenPurpose, TokenService};
    use crate::utils::error::AppResult;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use sqlx::PgPool;
    use std::sync::{Arc, Mutex};
    use tower::util::ServiceExt;

    #[derive(Default)]
    struct CapturingNotifier {
        tokens: Mutex<Vec<String>>,
    }

    impl CapturingNotifier {
        fn last_token(&self) -> String {
            self.tokens.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for CapturingNotifier {
        async fn send(&self, _: &str, _: &str, token: &str, _: TokenPurpose) -> AppResult<()> {
            self.tokens.lock().unwrap().push(token.to_string());
            Ok(())
        }
    }

    fn test_router(pool: PgPool) -> (Router, Arc<CapturingNotifier>) {
        let notifier = Arc::new(CapturingNotifier::default());
        let tokens = Arc::new(TokenService::new("test_signing_secret_key".to_string()));
        let state = AppState {
            member_service: Arc::new(MemberService::new(
                pool.clone(),
                tokens.clone(),
                notifier.clone(),
            )),
            token_service: tokens,
            pool,
        };
        (create_routes(state), notifier)
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const REGISTER_BODY: &str = r#"{
        "first": "Fast",
        "last": "Chat",
        "username": "fastchat",
        "email": "fastchat@mail.com",
        "password": "FastChatPass1!"
    }"#;

    async fn register_and_verify(router: &Router, notifier: &CapturingNotifier) {
        let response = router
            .clone()
            .oneshot(json_request("POST", "/auth", REGISTER_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let token = notifier.last_token();
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/auth/verify/{}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn login(router: &Router, email: &str, password: &str) -> StatusCode {
        let credentials = BASE64.encode(format!("{}:{}", email, password));
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth")
                    .header(header::AUTHORIZATION, format!("Basic {}", credentials))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    #[sqlx::test]
    async fn test_health_endpoint(pool: PgPool) {
        let (router, _) = test_router(pool);

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[sqlx::test]
    async fn test_disabled_routes_are_not_mounted(pool: PgPool) {
        let notifier = Arc::new(CapturingNotifier::default());
        let tokens = Arc::new(TokenService::new("test_signing_secret_key".to_string()));
        let state = AppState {
            member_service: Arc::new(MemberService::new(
                pool.clone(),
                tokens.clone(),
                notifier,
            )),
            token_service: tokens,
            pool,
        };
        let router = RouterBuilder::with_minimal_routes().build(state);

        let response = router
            .clone()
            .oneshot(json_request("POST", "/auth", REGISTER_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[sqlx::test]
    async fn test_register_verify_login_flow(pool: PgPool) {
        let (router, notifier) = test_router(pool);

        register_and_verify(&router, &notifier).await;
        assert_eq!(
            login(&router, "fastchat@mail.com", "FastChatPass1!").await,
            StatusCode::CREATED
        );
    }

    #[sqlx::test]
    async fn test_login_before_verification_is_unauthorized(pool: PgPool) {
        let (router, _) = test_router(pool);

        let response = router
            .clone()
            .oneshot(json_request("POST", "/auth", REGISTER_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        assert_eq!(
            login(&router, "fastchat@mail.com", "FastChatPass1!").await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[sqlx::test]
    async fn test_login_without_auth_header_is_bad_request(pool: PgPool) {
        let (router, _) = test_router(pool);

        // No Authorization header at all: the request is incomplete (400),
        // not a credential mismatch (401)
        let response = router
            .clone()
            .oneshot(Request::builder().uri("/auth").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Wrong scheme is equally malformed
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/auth")
                    .header(header::AUTHORIZATION, "Bearer some.session.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_register_duplicate_email_conflicts(pool: PgPool) {
        let (router, _) = test_router(pool);

        let response = router
            .clone()
            .oneshot(json_request("POST", "/auth", REGISTER_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .clone()
            .oneshot(json_request("POST", "/auth", REGISTER_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[sqlx::test]
    async fn test_register_invalid_email_is_bad_request(pool: PgPool) {
        let (router, _) = test_router(pool);

        let body = r#"{
            "first": "Fast",
            "last": "Chat",
            "email": "not-an-email",
            "password": "FastChatPass1!"
        }"#;
        let response = router
            .oneshot(json_request("POST", "/auth", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_garbage_verification_token_is_forbidden(pool: PgPool) {
        let (router, _) = test_router(pool);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/auth/verify/garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_change_password_requires_session(pool: PgPool) {
        let (router, _) = test_router(pool);

        let body = r#"{"old_password": "FastChatPass1!", "new_password": "BrandNewPass2@"}"#;
        let response = router
            .clone()
            .oneshot(json_request("PUT", "/auth/password", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/auth/password")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, "Bearer not.a.session")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_change_password_over_http(pool: PgPool) {
        let (router, notifier) = test_router(pool);
        register_and_verify(&router, &notifier).await;

        // Mint a session directly rather than parsing the login body
        let session = TokenService::new("test_signing_secret_key".to_string());
        let member_id: uuid::Uuid = {
            let claims: crate::models::VerificationClaims = session
                .verify(&notifier.last_token(), true)
                .unwrap();
            claims.member_id
        };
        let bearer = session
            .issue_session(member_id, "fastchat", "fastchat@mail.com")
            .unwrap();

        let body = r#"{"old_password": "FastChatPass1!", "new_password": "BrandNewPass2@"}"#;
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/auth/password")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(
            login(&router, "fastchat@mail.com", "BrandNewPass2@").await,
            StatusCode::CREATED
        );
    }

    #[sqlx::test]
    async fn test_password_reset_over_http(pool: PgPool) {
        let (router, notifier) = test_router(pool);
        register_and_verify(&router, &notifier).await;

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/password/reset",
                r#"{"email": "fastchat@mail.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let reset_token = notifier.last_token();
        let response = router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/auth/password/reset/{}", reset_token),
                r#"{"password": "AfterResetPass3#"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(
            login(&router, "fastchat@mail.com", "AfterResetPass3#").await,
            StatusCode::CREATED
        );
    }
}
