//! # Routes
//!
//! Axum router configuration for the M-Pesa API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  / - Liveness string
/// - GET  /health - Health check
/// - GET  /token - Access token passthrough (diagnostic)
/// - POST /stkpush - Initiate STK push
/// - POST /callback - Gateway result callback
///
/// The `/token`, `/stkpush` and `/callback` routes are also mounted under
/// `/api/mpesa` for clients that expect the router-style paths.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(mpesa_routes())
        .nest("/api/mpesa", mpesa_routes())
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}

/// Gateway routes, mounted at the root and under `/api/mpesa`
fn mpesa_routes() -> Router<AppState> {
    Router::new()
        .route("/token", get(handlers::get_token))
        .route("/stkpush", post(handlers::stk_push))
        .route("/callback", post(handlers::mpesa_callback))
}
