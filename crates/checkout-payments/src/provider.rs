//! Payment provider abstraction
//!
//! The services talk to Stripe through [`PaymentProvider`] so the HTTP layer
//! and tests can swap in [`crate::MockPaymentProvider`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata key carrying the purchasing user's id
pub const USER_ID_METADATA_KEY: &str = "uid";

/// Payment provider trait (Strategy pattern)
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted checkout session
    async fn create_checkout_session(&self, params: SessionParams) -> Result<CreatedSession>;

    /// Retrieve a session as Stripe returns it by default (no line items)
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails>;

    /// Retrieve a session with `line_items` expanded
    async fn retrieve_session_with_line_items(&self, session_id: &str) -> Result<SessionDetails>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Parameters for a single-item payment session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionParams {
    pub price_id: String,
    pub quantity: u64,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

/// What the provider hands back after creating a session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedSession {
    pub id: String,
    pub url: String,
}

/// Checkout session as seen by this backend.
///
/// Field names follow Stripe's JSON so the same type deserializes webhook
/// event objects and serializes to what the success page expects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub id: String,
    pub url: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub mode: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub payment_intent: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<LineItem>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub price_id: Option<String>,
    pub quantity: Option<u64>,
}

impl SessionDetails {
    /// User id embedded at creation time
    pub fn user_id(&self) -> Option<&str> {
        self.metadata
            .get(USER_ID_METADATA_KEY)
            .map(String::as_str)
            .filter(|uid| !uid.is_empty())
    }

    /// Price of the first line item, if line items were loaded
    pub fn first_price_id(&self) -> Option<&str> {
        self.line_items
            .as_deref()?
            .first()?
            .price_id
            .as_deref()
    }

    /// Whether the money has actually moved.
    ///
    /// A session without a status is treated as unpaid.
    pub fn is_paid(&self) -> bool {
        matches!(
            self.payment_status.as_deref(),
            Some("paid" | "no_payment_required")
        )
    }
}
