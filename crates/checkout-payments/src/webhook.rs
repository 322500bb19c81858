//! Stripe Webhook Handling
//!
//! Verifies incoming events and routes `checkout.session.completed` to
//! fulfillment. Everything else is acknowledged and ignored.

use std::sync::Arc;

use crate::config::PaymentsConfig;
use crate::error::Result;
use crate::event::{EventKind, PaymentEvent};
use crate::fulfillment::{FulfillmentHandler, FulfillmentReport};
use crate::signature::WebhookVerifier;

/// What happened to a verified event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    Fulfillment(FulfillmentReport),
    Ignored { event_type: String },
}

/// Webhook listener
pub struct WebhookListener {
    verifier: WebhookVerifier,
    fulfillment: Arc<FulfillmentHandler>,
}

impl WebhookListener {
    pub const fn new(verifier: WebhookVerifier, fulfillment: Arc<FulfillmentHandler>) -> Self {
        Self {
            verifier,
            fulfillment,
        }
    }

    pub fn from_config(config: &PaymentsConfig, fulfillment: Arc<FulfillmentHandler>) -> Self {
        Self::new(
            WebhookVerifier::new(config.webhook_secret.clone(), config.webhook_tolerance),
            fulfillment,
        )
    }

    pub const fn verifier(&self) -> &WebhookVerifier {
        &self.verifier
    }

    /// Verify the signature over the raw body and parse the event.
    ///
    /// Nothing in the body is trusted before this succeeds.
    pub fn construct_event(&self, payload: &[u8], signature: Option<&str>) -> Result<PaymentEvent> {
        self.verifier.verify(payload, signature)?;
        PaymentEvent::from_slice(payload)
    }

    /// Process a verified event
    pub async fn dispatch(&self, event: &PaymentEvent) -> WebhookOutcome {
        tracing::info!(event_id = %event.id, event_type = %event.event_type, "Processing Stripe webhook");

        match event.kind() {
            EventKind::CheckoutSessionCompleted => {
                let report = match event.checkout_session() {
                    Ok(session) => self.fulfillment.handle_completed(&session).await,
                    Err(e) => {
                        tracing::error!(event_id = %event.id, error = %e, "Unreadable checkout session");
                        FulfillmentReport::Failed(e.to_string())
                    }
                };
                WebhookOutcome::Fulfillment(report)
            }
            EventKind::Other(event_type) => {
                tracing::info!(event_type = %event_type, "Unhandled event type");
                WebhookOutcome::Ignored { event_type }
            }
        }
    }
}
