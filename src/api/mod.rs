//! API Module
//!
//! HTTP handlers, authentication middleware, and route composition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::AppState;
pub use middleware::AuthMember;
pub use routes::{create_routes, RouterBuilder};
