//! Mock Payment Provider
//!
//! In-memory stand-in for Stripe, for tests and offline demos. Sessions
//! created through it can be retrieved later, and every call is counted.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{PaymentError, Result};
use crate::provider::{CreatedSession, LineItem, PaymentProvider, SessionDetails, SessionParams};

const HOSTED_PAGE_BASE: &str = "https://pay.example";

#[derive(Default)]
struct MockState {
    sessions: HashMap<String, SessionDetails>,
    created: Vec<SessionParams>,
    retrievals: usize,
    queued_ids: VecDeque<String>,
    counter: u64,
    failure: Option<String>,
}

/// Mock provider backed by a hash map
#[derive(Default)]
pub struct MockPaymentProvider {
    state: Mutex<MockState>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `id` for the next created session instead of a generated one
    #[must_use]
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.state.get_mut().queued_ids.push_back(id.into());
        self
    }

    /// Make a session retrievable
    pub async fn insert_session(&self, session: SessionDetails) {
        self.state
            .lock()
            .await
            .sessions
            .insert(session.id.clone(), session);
    }

    /// Every subsequent call fails with a provider error
    pub async fn fail_with(&self, message: impl Into<String>) {
        self.state.lock().await.failure = Some(message.into());
    }

    /// Parameters of every creation call, in order
    pub async fn created_sessions(&self) -> Vec<SessionParams> {
        self.state.lock().await.created.clone()
    }

    /// Number of retrieval calls (with or without line items)
    pub async fn retrieval_count(&self) -> usize {
        self.state.lock().await.retrievals
    }

    /// Total number of provider calls
    pub async fn call_count(&self) -> usize {
        let state = self.state.lock().await;
        state.created.len() + state.retrievals
    }

    async fn lookup(&self, session_id: &str, with_line_items: bool) -> Result<SessionDetails> {
        let mut state = self.state.lock().await;
        state.retrievals += 1;

        if let Some(message) = &state.failure {
            return Err(PaymentError::Provider(message.clone()));
        }

        let mut session = state.sessions.get(session_id).cloned().ok_or_else(|| {
            PaymentError::Provider(format!("No such checkout.session: '{session_id}'"))
        })?;

        if !with_line_items {
            session.line_items = None;
        }
        Ok(session)
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(&self, params: SessionParams) -> Result<CreatedSession> {
        let mut state = self.state.lock().await;
        state.created.push(params.clone());

        if let Some(message) = &state.failure {
            return Err(PaymentError::Provider(message.clone()));
        }

        let id = match state.queued_ids.pop_front() {
            Some(id) => id,
            None => {
                state.counter += 1;
                format!("cs_test_{:04}", state.counter)
            }
        };
        let url = format!("{HOSTED_PAGE_BASE}/{id}");

        state.sessions.insert(
            id.clone(),
            SessionDetails {
                id: id.clone(),
                url: Some(url.clone()),
                status: Some("open".into()),
                payment_status: Some("unpaid".into()),
                mode: Some("payment".into()),
                metadata: params.metadata,
                line_items: Some(vec![LineItem {
                    price_id: Some(params.price_id),
                    quantity: Some(params.quantity),
                }]),
                ..Default::default()
            },
        );

        Ok(CreatedSession { id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        self.lookup(session_id, false).await
    }

    async fn retrieve_session_with_line_items(&self, session_id: &str) -> Result<SessionDetails> {
        self.lookup(session_id, true).await
    }

    fn name(&self) -> &str {
        "mock"
    }
}
