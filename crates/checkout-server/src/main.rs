//! checkout-server binary
//!
//! Serves the checkout API, the Stripe webhook and the WASM front-end.

use std::sync::Arc;

use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_payments::{MemoryFulfillmentStore, PaymentsConfig, StripeClient};
use checkout_server::{AppState, ServerConfig, TokenVerifier, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let server = ServerConfig::from_env()?;
    let payments = PaymentsConfig::from_env()?;

    let provider = Arc::new(StripeClient::new(&payments));
    tracing::info!(prices = payments.prices.len(), "✓ Stripe configured");
    for entry in payments.prices.entries() {
        tracing::info!("  • {} ({})", entry.price_id, entry.label);
    }

    // Purchases live in memory; swap in a durable FulfillmentStore for production
    let purchases = Arc::new(MemoryFulfillmentStore::new());

    let state = AppState::new(
        payments,
        provider,
        purchases,
        TokenVerifier::new(&server.auth),
    );

    let app = router(state).fallback_service(ServeDir::new(&server.static_dir));

    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 checkout-server running on http://{}", server.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                    - Health check");
    tracing::info!("  GET  /api/prices                - Purchasable prices");
    tracing::info!("  POST /api/createCheckoutSession - Start Stripe Checkout");
    tracing::info!("  POST /api/getSession            - Session details");
    tracing::info!("  POST /webhook/stripe            - Stripe events");
    tracing::info!("  GET  /*                         - Front-end ({})", server.static_dir.display());

    axum::serve(listener, app).await?;

    Ok(())
}
