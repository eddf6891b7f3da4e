//! # Roster Gateway Crate
//!
//! HTTP surface of the Roster user service. Requests are resolved to a
//! [`UserTarget`], handed to the injected [`UserStore`](roster_database::UserStore)
//! and answered with an [`Envelope`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roster_gateway::{build_router, AppState};
//!
//! # async fn run(pool: roster_database::SqlitePool) -> std::io::Result<()> {
//! let app = build_router(AppState::from_pool(pool));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod docs;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod target;

pub use docs::ApiDoc;
pub use envelope::{Envelope, EnvelopeStatus, ErrorBody};
pub use error::{ApiError, ApiResult, Operation};
pub use state::AppState;
pub use target::{resolve, resolve_single, TargetError, UserTarget};

use axum::{middleware as axum_middleware, routing::get, Router};

/// Create the main application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(rest::create_rest_routes())
        .route(docs::OPENAPI_PATH, get(docs::openapi_json))
        .with_state(state)
        .layer(middleware::create_cors_middleware())
        .layer(middleware::create_trace_middleware())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
