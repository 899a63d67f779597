//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Result<Router, ServerError> {
    let api_routes = Router::new()
        .route("/api/config", get(handlers::config::get_config))
        .route("/api/render", post(handlers::render::render));

    let router = Router::new()
        .merge(api_routes)
        .merge(static_files::static_router());

    let csp = security::csp_layer(&state.mathjax_url)?;

    Ok(router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(csp)
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state))
}
