//! Stripe Checkout Integration
//!
//! Implements [`PaymentProvider`] with the "Stripe Checkout (Hosted)" approach.

use async_trait::async_trait;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionId, CheckoutSessionMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionPaymentMethodTypes,
};

use crate::config::PaymentsConfig;
use crate::error::{PaymentError, Result};
use crate::provider::{
    CreatedSession, CustomerDetails, LineItem, PaymentProvider, SessionDetails, SessionParams,
};

/// Stripe client wrapper
///
/// Built once from configuration and shared; the underlying client holds
/// nothing but the secret key.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(config: &PaymentsConfig) -> Self {
        Self::from_secret_key(&config.secret_key)
    }

    pub fn from_secret_key(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    async fn retrieve(&self, session_id: &str, expand: &[&str]) -> Result<SessionDetails> {
        // Reported like any other failed lookup
        let id: CheckoutSessionId = session_id
            .parse()
            .map_err(|_| PaymentError::Provider(format!("Invalid session ID: {session_id}")))?;

        let session = StripeCheckoutSession::retrieve(&self.client, &id, expand)
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        Ok(to_details(&session))
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(&self, request: SessionParams) -> Result<CreatedSession> {
        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.metadata = Some(request.metadata.clone());
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price: Some(request.price_id.clone()),
            quantity: Some(request.quantity),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::Provider("No checkout URL returned".into()))?;

        Ok(CreatedSession {
            id: session.id.to_string(),
            url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        self.retrieve(session_id, &[]).await
    }

    async fn retrieve_session_with_line_items(&self, session_id: &str) -> Result<SessionDetails> {
        self.retrieve(session_id, &["line_items"]).await
    }

    fn name(&self) -> &str {
        "stripe"
    }
}

fn to_details(session: &StripeCheckoutSession) -> SessionDetails {
    SessionDetails {
        id: session.id.to_string(),
        url: session.url.clone(),
        status: session.status.as_ref().map(ToString::to_string),
        payment_status: Some(session.payment_status.to_string()),
        mode: Some(session.mode.to_string()),
        amount_total: session.amount_total,
        currency: session.currency.as_ref().map(ToString::to_string),
        customer_details: session.customer_details.as_ref().map(|d| CustomerDetails {
            name: d.name.clone(),
            email: d.email.clone(),
        }),
        payment_intent: session.payment_intent.as_ref().map(|p| p.id().to_string()),
        metadata: session.metadata.clone().unwrap_or_default(),
        line_items: session.line_items.as_ref().map(|list| {
            list.data
                .iter()
                .map(|item| LineItem {
                    price_id: item.price.as_ref().map(|p| p.id.to_string()),
                    quantity: item.quantity,
                })
                .collect()
        }),
    }
}
