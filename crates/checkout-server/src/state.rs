//! Application State

use std::sync::Arc;

use checkout_payments::{
    CheckoutService, FulfillmentHandler, FulfillmentStore, PaymentProvider, PaymentsConfig,
    SessionQueryService, WebhookListener,
};

use crate::auth::TokenVerifier;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub sessions: Arc<SessionQueryService>,
    pub webhooks: Arc<WebhookListener>,

    pub config: Arc<PaymentsConfig>,

    /// ID token validation
    pub tokens: Arc<TokenVerifier>,

    /// Name of the payment provider behind the services
    pub provider_name: String,
}

impl AppState {
    pub fn new(
        config: PaymentsConfig,
        provider: Arc<dyn PaymentProvider>,
        purchases: Arc<dyn FulfillmentStore>,
        tokens: TokenVerifier,
    ) -> Self {
        let config = Arc::new(config);
        let fulfillment = Arc::new(FulfillmentHandler::new(provider.clone(), purchases));

        Self {
            checkout: Arc::new(CheckoutService::new(provider.clone(), config.clone())),
            sessions: Arc::new(SessionQueryService::new(provider.clone(), config.clone())),
            webhooks: Arc::new(WebhookListener::from_config(&config, fulfillment)),
            provider_name: provider.name().to_string(),
            config,
            tokens: Arc::new(tokens),
        }
    }
}
