//! Fulfillment
//!
//! Records "this user bought this price" exactly once per checkout session.
//! Stripe delivers webhooks at least once, so the write is a conditional
//! insert keyed by session id: redeliveries find the record and do nothing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::provider::{PaymentProvider, SessionDetails};

/// Durable proof that a purchase was recognized
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentRecord {
    /// Checkout session id (idempotency key)
    pub session_id: String,

    pub user_id: String,
    pub price_id: String,

    #[serde(default)]
    pub payment_intent: Option<String>,

    pub fulfilled_at: DateTime<Utc>,
}

impl FulfillmentRecord {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        price_id: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            price_id: price_id.into(),
            payment_intent: None,
            fulfilled_at: Utc::now(),
        }
    }
}

/// Result of a conditional write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    Recorded,
    AlreadyFulfilled,
}

/// Fulfillment storage trait
#[async_trait]
pub trait FulfillmentStore: Send + Sync {
    /// Insert `record` unless its session was already fulfilled (atomic)
    async fn record_once(&self, record: FulfillmentRecord) -> Result<FulfillmentOutcome>;

    /// Get record by session ID
    async fn get(&self, session_id: &str) -> Result<Option<FulfillmentRecord>>;

    /// All purchases of a user, oldest first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<FulfillmentRecord>>;
}

/// In-memory fulfillment store (for development)
#[derive(Default)]
pub struct MemoryFulfillmentStore {
    records: RwLock<HashMap<String, FulfillmentRecord>>,
}

impl MemoryFulfillmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl FulfillmentStore for MemoryFulfillmentStore {
    async fn record_once(&self, record: FulfillmentRecord) -> Result<FulfillmentOutcome> {
        use std::collections::hash_map::Entry;

        let mut records = self.records.write().await;
        match records.entry(record.session_id.clone()) {
            Entry::Occupied(_) => Ok(FulfillmentOutcome::AlreadyFulfilled),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(FulfillmentOutcome::Recorded)
            }
        }
    }

    async fn get(&self, session_id: &str) -> Result<Option<FulfillmentRecord>> {
        Ok(self.records.read().await.get(session_id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<FulfillmentRecord>> {
        let records = self.records.read().await;
        let mut found: Vec<_> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.fulfilled_at);
        Ok(found)
    }
}

/// What the handler did with a completed session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FulfillmentReport {
    Fulfilled { user_id: String, price_id: String },
    Duplicate,
    NoLineItems,
    NotPaid { payment_status: Option<String> },
    MissingUser,
    Failed(String),
}

/// Applies completed checkout sessions to storage
pub struct FulfillmentHandler {
    provider: Arc<dyn PaymentProvider>,
    store: Arc<dyn FulfillmentStore>,
}

impl FulfillmentHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>, store: Arc<dyn FulfillmentStore>) -> Self {
        Self { provider, store }
    }

    /// Handle a verified `checkout.session.completed` session.
    ///
    /// Never fails: errors are logged and reported, the webhook is still
    /// acknowledged.
    pub async fn handle_completed(&self, session: &SessionDetails) -> FulfillmentReport {
        match self.fulfill(session).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(
                    session_id = %session.id,
                    uid = ?session.user_id(),
                    error = %e,
                    "Error processing checkout session"
                );
                FulfillmentReport::Failed(e.to_string())
            }
        }
    }

    async fn fulfill(&self, session: &SessionDetails) -> Result<FulfillmentReport> {
        // The event payload omits line items
        let full = self
            .provider
            .retrieve_session_with_line_items(&session.id)
            .await?;

        let uid = full.user_id().or_else(|| session.user_id());

        let Some(price_id) = full.first_price_id() else {
            tracing::warn!(
                session_id = %session.id,
                uid = ?uid,
                "No line items found for session"
            );
            return Ok(FulfillmentReport::NoLineItems);
        };

        if !full.is_paid() {
            tracing::warn!(
                session_id = %session.id,
                payment_status = ?full.payment_status,
                "Checkout completed without payment, skipping fulfillment"
            );
            return Ok(FulfillmentReport::NotPaid {
                payment_status: full.payment_status.clone(),
            });
        }

        let Some(uid) = uid else {
            tracing::warn!(session_id = %session.id, "Session metadata has no user id");
            return Ok(FulfillmentReport::MissingUser);
        };

        let mut record = FulfillmentRecord::new(&full.id, uid, price_id);
        record.payment_intent = full.payment_intent.clone();

        match self.store.record_once(record).await? {
            FulfillmentOutcome::Recorded => {
                tracing::info!(
                    session_id = %session.id,
                    uid = %uid,
                    price_id = %price_id,
                    "Fulfilled checkout session"
                );
                Ok(FulfillmentReport::Fulfilled {
                    user_id: uid.to_string(),
                    price_id: price_id.to_string(),
                })
            }
            FulfillmentOutcome::AlreadyFulfilled => {
                tracing::info!(session_id = %session.id, "Session already fulfilled, ignoring redelivery");
                Ok(FulfillmentReport::Duplicate)
            }
        }
    }
}
