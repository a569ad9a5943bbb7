//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware;
use crate::settings::Settings;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, StartupError};

/// Build the full HTTP router from settings (entrypoint used by `main.rs`).
pub async fn build_app(settings: &Settings) -> Result<Router, StartupError> {
    let services = services::build_services(settings).await?;
    Ok(router_with(Arc::new(services)))
}

/// Build the router around already constructed services.
pub fn router_with(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: Arc::new(services.jwt.clone()),
        services: services.clone(),
    };

    // Protected routes: require a valid token and carry company context.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/setup", post(routes::auth::setup))
        .route("/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
