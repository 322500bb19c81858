//! Checkout HTTP Server
//!
//! Axum router exposing the checkout callables, the Stripe webhook and a
//! health check. The binary adds the static front-end bundle.

pub mod auth;
pub mod callable;
pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{any, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use auth::{Caller, TokenVerifier};
pub use config::{AuthConfig, ConfigError, ServerConfig};
pub use state::AppState;

use crate::handlers::{
    create_checkout_session, get_session, health_check, list_prices, stripe_webhook,
};

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/prices", get(list_prices))
        .route("/createCheckoutSession", post(create_checkout_session))
        .route("/getSession", post(get_session))
        .layer(cors);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        // Webhook answers its own OPTIONS and 405s
        .route("/webhook/stripe", any(stripe_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
