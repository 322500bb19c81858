//! Checkout Session Service
//!
//! Turns an authenticated "buy this price" request into a hosted Stripe
//! Checkout session.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::PaymentsConfig;
use crate::error::{PaymentError, Result};
use crate::identity::CallerIdentity;
use crate::provider::{PaymentProvider, SessionParams, USER_ID_METADATA_KEY};

/// Request to create a checkout session
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    /// Stripe price the user picked
    #[serde(default)]
    pub price_id: Option<String>,
}

impl CreateCheckoutRequest {
    pub fn for_price(price_id: impl Into<String>) -> Self {
        Self {
            price_id: Some(price_id.into()),
        }
    }
}

/// Result of creating a checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,

    /// Stripe session ID
    pub session_id: String,

    /// URL to redirect user to
    pub url: String,
}

pub struct CheckoutService {
    provider: Arc<dyn PaymentProvider>,
    config: Arc<PaymentsConfig>,
}

impl CheckoutService {
    pub fn new(provider: Arc<dyn PaymentProvider>, config: Arc<PaymentsConfig>) -> Self {
        Self { provider, config }
    }

    /// Create a Stripe Checkout session for `caller`.
    ///
    /// Authentication and allow-list checks happen before any provider call.
    pub async fn create_session(
        &self,
        caller: Option<&CallerIdentity>,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutResponse> {
        let caller = caller.ok_or_else(|| {
            PaymentError::Unauthenticated(
                "You must be authenticated to create a checkout session.".into(),
            )
        })?;

        let price_id = request
            .price_id
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                PaymentError::InvalidArgument("Missing required data to process request.".into())
            })?;

        if !self.config.prices.contains(&price_id) {
            tracing::warn!(uid = %caller.uid, price_id = %price_id, "Rejected unknown price");
            return Err(PaymentError::InvalidArgument(
                "PriceId in request does not exist.".into(),
            ));
        }

        let params = SessionParams {
            price_id: price_id.clone(),
            quantity: 1,
            success_url: self.config.success_url.clone(),
            cancel_url: self.config.cancel_url.clone(),
            metadata: HashMap::from([(USER_ID_METADATA_KEY.to_string(), caller.uid.clone())]),
        };

        let session = self
            .provider
            .create_checkout_session(params)
            .await
            .map_err(|e| {
                tracing::error!(
                    uid = %caller.uid,
                    price_id = %price_id,
                    provider = self.provider.name(),
                    error = %e,
                    "Error creating checkout session"
                );
                e.or_internal("An error occurred while attempting to create a checkout session.")
            })?;

        tracing::info!(
            uid = %caller.uid,
            price_id = %price_id,
            session_id = %session.id,
            "Created checkout session"
        );

        Ok(CheckoutResponse {
            success: true,
            session_id: session.id,
            url: session.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PriceAllowList;
    use crate::error::ErrorCode;
    use crate::mock::MockPaymentProvider;
    use std::time::Duration;

    fn config() -> Arc<PaymentsConfig> {
        Arc::new(PaymentsConfig {
            secret_key: "sk_test".into(),
            webhook_secret: "whsec_test".into(),
            prices: PriceAllowList::parse("price_123:Starter"),
            success_url: "https://shop.example/success?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "https://shop.example/cancel".into(),
            webhook_tolerance: Duration::from_secs(300),
            require_session_owner: true,
        })
    }

    fn service(mock: &Arc<MockPaymentProvider>) -> CheckoutService {
        CheckoutService::new(mock.clone(), config())
    }

    #[tokio::test]
    async fn test_unauthenticated_makes_no_provider_call() {
        let mock = Arc::new(MockPaymentProvider::new());

        let err = service(&mock)
            .create_session(None, CreateCheckoutRequest::for_price("price_123"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::Unauthenticated));
        assert_eq!(mock.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_price_is_invalid_argument() {
        let mock = Arc::new(MockPaymentProvider::new());
        let caller = CallerIdentity::new("u1");

        for request in [
            CreateCheckoutRequest::default(),
            CreateCheckoutRequest::for_price("  "),
        ] {
            let err = service(&mock)
                .create_session(Some(&caller), request)
                .await
                .unwrap_err();
            assert_eq!(err.code(), Some(ErrorCode::InvalidArgument));
        }
        assert_eq!(mock.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_price_makes_no_provider_call() {
        let mock = Arc::new(MockPaymentProvider::new());
        let caller = CallerIdentity::new("u1");

        let err = service(&mock)
            .create_session(Some(&caller), CreateCheckoutRequest::for_price("price_999"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PaymentError::InvalidArgument("PriceId in request does not exist.".into())
        );
        assert_eq!(mock.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_allowed_price_creates_exactly_one_session() {
        let mock = Arc::new(MockPaymentProvider::new().with_session_id("cs_test_abc"));
        let caller = CallerIdentity::new("u1");

        let response = service(&mock)
            .create_session(Some(&caller), CreateCheckoutRequest::for_price("price_123"))
            .await
            .unwrap();

        assert_eq!(
            response,
            CheckoutResponse {
                success: true,
                session_id: "cs_test_abc".into(),
                url: "https://pay.example/cs_test_abc".into(),
            }
        );

        let created = mock.created_sessions().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].price_id, "price_123");
        assert_eq!(created[0].quantity, 1);
        assert_eq!(created[0].metadata.get("uid").map(String::as_str), Some("u1"));
        assert!(created[0].success_url.ends_with("session_id={CHECKOUT_SESSION_ID}"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_normalized() {
        let mock = Arc::new(MockPaymentProvider::new());
        mock.fail_with("Invalid API Key provided: sk_test_***").await;
        let caller = CallerIdentity::new("u1");

        let err = service(&mock)
            .create_session(Some(&caller), CreateCheckoutRequest::for_price("price_123"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::Internal));
        assert!(!err.message().contains("API Key"));
    }
}
