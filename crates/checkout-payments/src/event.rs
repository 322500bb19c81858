//! Stripe webhook events

use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};
use crate::provider::SessionDetails;

const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Verified webhook event, kept close to Stripe's envelope
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub livemode: bool,

    pub data: EventData,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Event types this backend acts on
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    CheckoutSessionCompleted,
    Other(String),
}

impl PaymentEvent {
    /// Parse a raw, already verified body
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| PaymentError::WebhookParse(e.to_string()))
    }

    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => EventKind::CheckoutSessionCompleted,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// The embedded checkout session
    pub fn checkout_session(&self) -> Result<SessionDetails> {
        SessionDetails::deserialize(&self.data.object).map_err(|e| {
            PaymentError::WebhookParse(format!("Invalid checkout session data: {e}"))
        })
    }
}
