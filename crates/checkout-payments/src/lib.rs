//! # checkout-payments
//!
//! Stripe Checkout (hosted) sessions, webhook verification and purchase
//! fulfillment.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  createCheckoutSession  ┌─────────────────┐
//! │  Your Site  │────────────────────────▶│  Stripe Hosted  │
//! │  (pricing)  │                         │  Checkout Page  │
//! └─────────────┘                         └────────┬────────┘
//!        ▲                                         │ redirect
//!        │ getSession (display only)               ▼
//! ┌──────┴──────┐                         ┌─────────────────┐
//! │  /success   │                         │ Stripe webhook  │──▶ fulfillment
//! └─────────────┘                         └─────────────────┘     (once per session)
//! ```
//!
//! Fulfillment is driven by the webhook only. The success page never grants
//! anything, so a user closing the tab after paying still gets their purchase.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use checkout_payments::{
//!     CheckoutService, CreateCheckoutRequest, MemoryFulfillmentStore, PaymentsConfig, StripeClient,
//! };
//!
//! let config = Arc::new(PaymentsConfig::from_env()?);
//! let provider = Arc::new(StripeClient::new(&config));
//! let checkout = CheckoutService::new(provider, config);
//!
//! let response = checkout
//!     .create_session(Some(&caller), CreateCheckoutRequest::for_price("price_123"))
//!     .await?;
//! // Redirect the browser to: response.url
//! ```

mod checkout;
mod config;
mod error;
mod event;
mod fulfillment;
mod identity;
mod mock;
mod provider;
mod session;
mod signature;
mod stripe_client;
mod webhook;

pub use checkout::{CheckoutResponse, CheckoutService, CreateCheckoutRequest};
pub use config::{PaymentsConfig, PriceAllowList, PriceEntry};
pub use error::{ErrorCode, PaymentError, Result};
pub use event::{EventData, EventKind, PaymentEvent};
pub use fulfillment::{
    FulfillmentHandler, FulfillmentOutcome, FulfillmentRecord, FulfillmentReport,
    FulfillmentStore, MemoryFulfillmentStore,
};
pub use identity::CallerIdentity;
pub use mock::MockPaymentProvider;
pub use provider::{
    CreatedSession, CustomerDetails, LineItem, PaymentProvider, SessionDetails, SessionParams,
    USER_ID_METADATA_KEY,
};
pub use session::{GetSessionRequest, SessionQueryService, SessionResponse};
pub use signature::{SignatureHeader, WebhookVerifier};
pub use stripe_client::StripeClient;
pub use webhook::{WebhookListener, WebhookOutcome};
