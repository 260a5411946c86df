//! Chat Auth Development Server
//!
//! Development server for the chat authentication library. Loads
//! configuration from the environment, connects to PostgreSQL, runs
//! migrations, and serves the full HTTP API.
//!
//! For deployments that need a subset of the endpoints, use the
//! RouterBuilder from your own binary.

use std::sync::Arc;

use dotenv::dotenv;

use chat_auth::{
    api::{create_routes, AppState},
    config::AppConfig,
    database::create_pool,
    service::{EmailService, MemberService, TokenService},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();
    env_logger::init();

    log::info!("🚀 Starting Chat Auth Service v{}", chat_auth::VERSION);

    let config = AppConfig::from_env()?;
    log::info!("✅ Configuration loaded");

    let pool = create_pool(&config.database).await?;

    log::info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("✅ Database migrations completed");

    let token_service = Arc::new(TokenService::new(config.token.jwt_secret.clone()));
    let email_service = Arc::new(EmailService::new(config.email.clone())?);
    let member_service = Arc::new(MemberService::new(
        pool.clone(),
        token_service.clone(),
        email_service,
    ));
    log::info!("✅ Services initialized");

    let state = AppState {
        member_service,
        token_service,
        pool,
    };
    let app = create_routes(state);

    let bind_addr = config.server.bind_address();
    log::info!("🌐 Starting server on {}", bind_addr);

    log::info!("📋 API Endpoints:");
    log::info!("   GET  /health - Health check");
    log::info!("   POST /auth - Register a new member");
    log::info!("   GET  /auth - Login (HTTP Basic) -> session token");
    log::info!("   GET  /auth/verify/:token - Verify email address");
    log::info!("   POST /auth/verify - Re-send verification email");
    log::info!("   PUT  /auth/password - Change password (Bearer session)");
    log::info!("   POST /auth/password/reset - Request password reset email");
    log::info!("   PUT  /auth/password/reset/:token - Complete password reset");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("✅ Server listening and ready for requests");
    axum::serve(listener, app).await?;

    Ok(())
}
